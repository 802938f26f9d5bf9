//! Instrumented data source

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use locus::domain::entities::{
    CoverageArea, CoverageAreaPatch, LocationNode, LocationPatch, NewCoverageArea, NewLocation,
    UserCoverageAssignment,
};
use locus::domain::ports::{
    CoverageAreaFilter, LocationDataSource, LocationFilter, SourceError, SourceResult,
};
use locus::{CoverageAreaId, Dataset, EngineOptions, InMemorySource, LocationEngine, LocationId};

/// Wraps `InMemorySource`, counting child fetches and injecting faults
pub struct ProbeSource {
    pub inner: InMemorySource,
    delay: Duration,
    children_calls: AtomicUsize,
    fail_children: AtomicBool,
    fail_writes: AtomicBool,
    parentless_children: AtomicBool,
}

impl ProbeSource {
    pub fn new(data: Dataset) -> Self {
        Self {
            inner: InMemorySource::new(data),
            delay: Duration::ZERO,
            children_calls: AtomicUsize::new(0),
            fail_children: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            parentless_children: AtomicBool::new(false),
        }
    }

    /// Child fetches wait this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn children_calls(&self) -> usize {
        self.children_calls.load(Ordering::SeqCst)
    }

    pub fn fail_children(&self, fail: bool) {
        self.fail_children.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Child listings omit the parent field, as some legacy endpoints do
    pub fn parentless_children(&self, strip: bool) {
        self.parentless_children.store(strip, Ordering::SeqCst);
    }

    fn write_guard(&self) -> SourceResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SourceError::Rejected {
                status: 500,
                message: "write refused".into(),
            });
        }
        Ok(())
    }
}

/// Engine plus a handle on its source for assertions
pub fn engine_with(source: ProbeSource) -> (LocationEngine<ProbeSource>, Arc<ProbeSource>) {
    engine_with_options(source, EngineOptions::default())
}

pub fn engine_with_options(
    source: ProbeSource,
    options: EngineOptions,
) -> (LocationEngine<ProbeSource>, Arc<ProbeSource>) {
    let source = Arc::new(source);
    let engine = LocationEngine::with_options(Arc::clone(&source), options);
    (engine, source)
}

#[async_trait]
impl LocationDataSource for ProbeSource {
    async fn list_locations(&self, filter: &LocationFilter) -> SourceResult<Vec<LocationNode>> {
        self.inner.list_locations(filter).await
    }

    async fn get_location_tree(&self, include_inactive: bool) -> SourceResult<Vec<LocationNode>> {
        self.inner.get_location_tree(include_inactive).await
    }

    async fn get_children(&self, parent: &LocationId) -> SourceResult<Vec<LocationNode>> {
        self.children_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail_children.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("connection reset".into()));
        }
        let mut children = self.inner.get_children(parent).await?;
        if self.parentless_children.load(Ordering::SeqCst) {
            for child in &mut children {
                child.parent_id = None;
            }
        }
        Ok(children)
    }

    async fn create_location(&self, draft: &NewLocation) -> SourceResult<LocationNode> {
        self.write_guard()?;
        self.inner.create_location(draft).await
    }

    async fn update_location(
        &self,
        id: &LocationId,
        patch: &LocationPatch,
    ) -> SourceResult<LocationNode> {
        self.write_guard()?;
        self.inner.update_location(id, patch).await
    }

    async fn delete_location(&self, id: &LocationId) -> SourceResult<()> {
        self.write_guard()?;
        self.inner.delete_location(id).await
    }

    async fn list_coverage_areas(
        &self,
        filter: &CoverageAreaFilter,
    ) -> SourceResult<Vec<CoverageArea>> {
        self.inner.list_coverage_areas(filter).await
    }

    async fn create_coverage_area(&self, draft: &NewCoverageArea) -> SourceResult<CoverageArea> {
        self.write_guard()?;
        self.inner.create_coverage_area(draft).await
    }

    async fn update_coverage_area(
        &self,
        id: &CoverageAreaId,
        patch: &CoverageAreaPatch,
    ) -> SourceResult<CoverageArea> {
        self.write_guard()?;
        self.inner.update_coverage_area(id, patch).await
    }

    async fn delete_coverage_area(&self, id: &CoverageAreaId) -> SourceResult<()> {
        self.write_guard()?;
        self.inner.delete_coverage_area(id).await
    }

    async fn get_coverage_area_users(
        &self,
        id: &CoverageAreaId,
    ) -> SourceResult<Vec<UserCoverageAssignment>> {
        self.inner.get_coverage_area_users(id).await
    }
}
