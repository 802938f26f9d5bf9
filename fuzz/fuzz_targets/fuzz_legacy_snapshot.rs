#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Snapshot normalization sees arbitrary backend payloads
        if let Ok(dataset) = locus::Dataset::from_json(content) {
            let _ = locus::domain::entities::LocationStore::from_nodes(dataset.locations);
        }
    }
});
