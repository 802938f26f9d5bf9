#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data) {
        if let Ok(ty) = raw.parse::<locus::LocationType>() {
            // Parsing the canonical name yields the same level
            assert_eq!(ty.as_str().parse::<locus::LocationType>().ok(), Some(ty));
        }
    }
});
