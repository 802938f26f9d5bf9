//! REST data source
//!
//! Talks to the dashboard backend over HTTP. Responses go through the legacy
//! normalizer so older deployments work unchanged.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;
use crate::domain::entities::{
    CoverageArea, CoverageAreaPatch, LocationNode, LocationPatch, NewCoverageArea, NewLocation,
    UserCoverageAssignment,
};
use crate::domain::ports::{
    CoverageAreaFilter, LocationDataSource, LocationFilter, SourceError, SourceResult,
};
use crate::domain::value_objects::{CoverageAreaId, LocationId};

use super::legacy;

/// Connection settings for [`RestSource`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_secs: u64,
}

impl RestConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout_secs: 30,
        }
    }

    /// `None` when no base URL is configured
    pub fn from_api(api: &ApiConfig) -> Option<Self> {
        api.base_url.as_ref().map(|url| Self {
            base_url: url.clone(),
            token: api.token.clone(),
            timeout_secs: api.timeout_secs,
        })
    }
}

pub struct RestSource {
    base_url: String,
    client: Client,
}

impl RestSource {
    pub fn new(config: RestConfig) -> SourceResult<Self> {
        let mut headers = header::HeaderMap::new();
        if let Some(token) = &config.token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| SourceError::Unavailable("API token is not a valid header".into()))?;
            headers.insert(header::AUTHORIZATION, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> SourceResult<Value> {
        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        handle_response(response).await
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> SourceResult<Value> {
        debug!(path, "GET");
        self.send(self.client.get(self.url(path)).query(query)).await
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> SourceResult<Value> {
        debug!(path, "POST");
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> SourceResult<Value> {
        debug!(path, "PUT");
        self.send(self.client.put(self.url(path)).json(body)).await
    }

    async fn delete(&self, path: &str) -> SourceResult<()> {
        debug!(path, "DELETE");
        self.send(self.client.delete(self.url(path))).await.map(|_| ())
    }
}

async fn handle_response(response: reqwest::Response) -> SourceResult<Value> {
    let status = response.status();
    let url = response.url().to_string();

    if status == StatusCode::NOT_FOUND {
        return Err(SourceError::NotFound(url));
    }

    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(SourceError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| SourceError::Unavailable(e.to_string()))?;
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&body).map_err(|e| SourceError::Malformed(e.to_string()))
}

fn single_location(value: Value) -> SourceResult<LocationNode> {
    legacy::normalize_location(&legacy::unwrap_envelope(value))
}

fn single_area(value: Value) -> SourceResult<CoverageArea> {
    legacy::normalize_coverage_area(&legacy::unwrap_envelope(value))
}

fn location_query(filter: &LocationFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(ty) = filter.location_type {
        query.push(("type", ty.to_string()));
    }
    if let Some(active) = filter.is_active {
        query.push(("isActive", active.to_string()));
    }
    if let Some(term) = &filter.search {
        query.push(("search", term.clone()));
    }
    query
}

fn area_query(filter: &CoverageAreaFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(unit) = &filter.geographic_unit_id {
        query.push(("geographicUnitId", unit.to_string()));
    }
    if let Some(org) = &filter.organization_id {
        query.push(("organizationId", org.clone()));
    }
    if let Some(active) = filter.is_active {
        query.push(("isActive", active.to_string()));
    }
    query
}

#[async_trait]
impl LocationDataSource for RestSource {
    async fn list_locations(&self, filter: &LocationFilter) -> SourceResult<Vec<LocationNode>> {
        let value = self.get("locations", &location_query(filter)).await?;
        let nodes = legacy::normalize_locations(value)?;
        // Older backends ignore query parameters
        Ok(nodes.into_iter().filter(|n| filter.matches(n)).collect())
    }

    async fn get_location_tree(&self, include_inactive: bool) -> SourceResult<Vec<LocationNode>> {
        let value = self
            .get(
                "locations/tree",
                &[("includeInactive", include_inactive.to_string())],
            )
            .await?;
        legacy::normalize_locations(value)
    }

    async fn get_children(&self, parent: &LocationId) -> SourceResult<Vec<LocationNode>> {
        let value = self
            .get(&format!("locations/{}/children", parent), &[])
            .await?;
        legacy::normalize_locations(value)
    }

    async fn create_location(&self, draft: &NewLocation) -> SourceResult<LocationNode> {
        single_location(self.post("locations", draft).await?)
    }

    async fn update_location(
        &self,
        id: &LocationId,
        patch: &LocationPatch,
    ) -> SourceResult<LocationNode> {
        single_location(self.put(&format!("locations/{}", id), patch).await?)
    }

    async fn delete_location(&self, id: &LocationId) -> SourceResult<()> {
        self.delete(&format!("locations/{}", id)).await
    }

    async fn list_coverage_areas(
        &self,
        filter: &CoverageAreaFilter,
    ) -> SourceResult<Vec<CoverageArea>> {
        let value = self.get("coverage-areas", &area_query(filter)).await?;
        let areas = legacy::normalize_coverage_areas(value)?;
        Ok(areas.into_iter().filter(|a| filter.matches(a)).collect())
    }

    async fn create_coverage_area(&self, draft: &NewCoverageArea) -> SourceResult<CoverageArea> {
        single_area(self.post("coverage-areas", draft).await?)
    }

    async fn update_coverage_area(
        &self,
        id: &CoverageAreaId,
        patch: &CoverageAreaPatch,
    ) -> SourceResult<CoverageArea> {
        single_area(self.put(&format!("coverage-areas/{}", id), patch).await?)
    }

    async fn delete_coverage_area(&self, id: &CoverageAreaId) -> SourceResult<()> {
        self.delete(&format!("coverage-areas/{}", id)).await
    }

    async fn get_coverage_area_users(
        &self,
        id: &CoverageAreaId,
    ) -> SourceResult<Vec<UserCoverageAssignment>> {
        let value = self
            .get(&format!("coverage-areas/{}/users", id), &[])
            .await?;
        legacy::normalize_assignments(value)
    }
}
