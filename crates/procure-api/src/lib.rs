// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use procure_app::{
    ApiError, BundleRecommendationDto, ChatRequest, ChatResponse, DemoLoadResponse,
    HealthResponse, InsightsApi, ReorderPredictionDto, RequestContext,
};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub const ORG_HEADER: &str = "X-Org-Id";
pub const ROLE_HEADER: &str = "X-Role";
pub const CACHED_AI_HEADER: &str = "X-Use-Cached-AI";

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(invalid_base_url(base_url, "api.base_url must not be empty"));
        }
        let parsed =
            Url::parse(trimmed).map_err(|error| invalid_base_url(base_url, &error.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(invalid_base_url(base_url, "expected an http(s) URL"));
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| ApiError::ClientBuild(error.to_string()))?;

        Ok(Self {
            base_url: parsed,
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        ctx: &RequestContext,
        what: &'static str,
    ) -> Result<T, ApiError> {
        let response = request
            .header(ORG_HEADER, &ctx.identity.org_id)
            .header(ROLE_HEADER, &ctx.identity.role)
            .header(CACHED_AI_HEADER, if ctx.use_cached_ai { "true" } else { "false" })
            .send()
            .map_err(|error| connection_error(self.base_url(), &error))?;

        let status = response.status();
        debug!(status = status.as_u16(), what, "insights API responded");
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        response.json().map_err(|error| ApiError::Decode {
            what,
            reason: error.to_string(),
        })
    }
}

impl InsightsApi for Client {
    fn load_demo_data(&self, ctx: &RequestContext) -> Result<DemoLoadResponse, ApiError> {
        let url = self.endpoint(&["api", "purchases", "demo", "load"]);
        let request = self.http.post(url).json(&serde_json::json!({}));
        self.send(request, ctx, "demo load response")
    }

    fn reorders(
        &self,
        ctx: &RequestContext,
        limit: usize,
    ) -> Result<Vec<ReorderPredictionDto>, ApiError> {
        let mut url = self.endpoint(&["api", "purchases", "insights", "reorders"]);
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        self.send(self.http.get(url), ctx, "reorder predictions")
    }

    fn bundles(
        &self,
        ctx: &RequestContext,
        sku: &str,
    ) -> Result<Vec<BundleRecommendationDto>, ApiError> {
        let url = self.endpoint(&["api", "purchases", "insights", "bundles", sku]);
        self.send(self.http.get(url), ctx, "bundle recommendations")
    }

    fn chat(&self, ctx: &RequestContext, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        let url = self.endpoint(&["api", "assistant", "chat"]);
        self.send(self.http.post(url).json(request), ctx, "chat response")
    }

    fn health(&self, ctx: &RequestContext) -> Result<HealthResponse, ApiError> {
        let url = self.endpoint(&["api", "health"]);
        self.send(self.http.get(url), ctx, "health response")
    }
}

fn invalid_base_url(url: &str, reason: &str) -> ApiError {
    ApiError::InvalidBaseUrl {
        url: url.to_owned(),
        reason: reason.to_owned(),
    }
}

fn connection_error(base_url: &str, error: &reqwest::Error) -> ApiError {
    ApiError::Transport {
        base_url: base_url.to_owned(),
        reason: error.to_string(),
    }
}

fn clean_error_response(status: StatusCode, body: &str) -> ApiError {
    if let Ok(parsed) = serde_json::from_str::<ServerErrorBody>(body)
        && let Some(message) = parsed.message
        && !message.is_empty()
    {
        return ApiError::Server {
            status: status.as_u16(),
            message,
        };
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return ApiError::Server {
            status: status.as_u16(),
            message: trimmed.to_owned(),
        };
    }

    ApiError::Status(status.as_u16())
}

/// Error envelope returned by the insights service.
#[derive(Debug, Deserialize)]
struct ServerErrorBody {
    message: Option<String>,
}
