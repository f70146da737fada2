// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use procure_app::{
    ApiError, BundleRecommendationDto, ChatRequest, ChatResponse, DemoLoadResponse,
    HealthResponse, HealthStatus, InsightsApi, ReorderPredictionDto, RequestContext,
    ShoppingListItem,
};
use std::cell::RefCell;
use std::collections::HashMap;
use time::OffsetDateTime;
use time::macros::datetime;

pub const DEMO_ORG: &str = "demo-org-a";

/// Fixed clock for runtimes under test.
pub fn fixed_now() -> OffsetDateTime {
    datetime!(2024-04-01 00:00 UTC)
}

pub fn prediction(sku: &str, name: &str) -> ReorderPredictionDto {
    ReorderPredictionDto {
        org_id: DEMO_ORG.to_owned(),
        sku: sku.to_owned(),
        product_name: name.to_owned(),
        last_purchase_at: Some("2024-04-01T00:00:00Z".to_owned()),
        median_days_between: 7,
        predicted_reorder_at: Some("2024-04-08T00:00:00Z".to_owned()),
        confidence: 0.8,
        last_quantity: 10,
        explanation: None,
    }
}

pub fn bundle(sku: &str, related_sku: &str, related_name: &str) -> BundleRecommendationDto {
    BundleRecommendationDto {
        org_id: DEMO_ORG.to_owned(),
        sku: sku.to_owned(),
        related_sku: related_sku.to_owned(),
        related_name: related_name.to_owned(),
        co_purchase_count: 3,
        rationale: None,
    }
}

pub fn shopping_item(sku: &str, name: &str, qty: i64) -> ShoppingListItem {
    ShoppingListItem {
        sku: sku.to_owned(),
        name: name.to_owned(),
        qty,
        reason: "starter kit".to_owned(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    LoadDemo(RequestContext),
    Reorders {
        ctx: RequestContext,
        limit: usize,
    },
    Bundles {
        ctx: RequestContext,
        sku: String,
    },
    Chat {
        ctx: RequestContext,
        request: ChatRequest,
    },
    Health(RequestContext),
}

/// Scripted in-memory stand-in for the insights API. Every call is recorded
/// in order.
#[derive(Debug)]
pub struct FakeApi {
    demo: Result<DemoLoadResponse, ApiError>,
    reorders: Result<Vec<ReorderPredictionDto>, ApiError>,
    bundles: HashMap<String, Result<Vec<BundleRecommendationDto>, ApiError>>,
    chat: Result<ChatResponse, ApiError>,
    health: Result<HealthResponse, ApiError>,
    calls: RefCell<Vec<ApiCall>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            demo: Ok(DemoLoadResponse {
                org_id: DEMO_ORG.to_owned(),
                imported_rows: 0,
            }),
            reorders: Ok(Vec::new()),
            bundles: HashMap::new(),
            chat: Ok(ChatResponse::default()),
            health: Ok(HealthResponse {
                status: HealthStatus::Up,
                timestamp: "2024-04-01T00:00:00Z".to_owned(),
            }),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_demo(mut self, org_id: &str, imported_rows: u64) -> Self {
        self.demo = Ok(DemoLoadResponse {
            org_id: org_id.to_owned(),
            imported_rows,
        });
        self
    }

    pub fn with_demo_error(mut self, error: ApiError) -> Self {
        self.demo = Err(error);
        self
    }

    pub fn with_reorders(mut self, rows: Vec<ReorderPredictionDto>) -> Self {
        self.reorders = Ok(rows);
        self
    }

    pub fn with_reorders_error(mut self, error: ApiError) -> Self {
        self.reorders = Err(error);
        self
    }

    pub fn with_bundles(mut self, sku: &str, items: Vec<BundleRecommendationDto>) -> Self {
        self.bundles.insert(sku.to_owned(), Ok(items));
        self
    }

    pub fn with_bundles_error(mut self, sku: &str, error: ApiError) -> Self {
        self.bundles.insert(sku.to_owned(), Err(error));
        self
    }

    pub fn with_chat(mut self, response: ChatResponse) -> Self {
        self.chat = Ok(response);
        self
    }

    pub fn with_chat_error(mut self, error: ApiError) -> Self {
        self.chat = Err(error);
        self
    }

    pub fn with_health(mut self, response: HealthResponse) -> Self {
        self.health = Ok(response);
        self
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.borrow().clone()
    }

    pub fn demo_loads(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, ApiCall::LoadDemo(_)))
            .count()
    }

    pub fn reorder_fetches(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| matches!(call, ApiCall::Reorders { .. }))
            .count()
    }

    pub fn bundle_skus(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                ApiCall::Bundles { sku, .. } => Some(sku.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                ApiCall::Chat { request, .. } => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ApiCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl InsightsApi for FakeApi {
    fn load_demo_data(&self, ctx: &RequestContext) -> Result<DemoLoadResponse, ApiError> {
        self.record(ApiCall::LoadDemo(ctx.clone()));
        self.demo.clone()
    }

    fn reorders(
        &self,
        ctx: &RequestContext,
        limit: usize,
    ) -> Result<Vec<ReorderPredictionDto>, ApiError> {
        self.record(ApiCall::Reorders {
            ctx: ctx.clone(),
            limit,
        });
        self.reorders.clone()
    }

    fn bundles(
        &self,
        ctx: &RequestContext,
        sku: &str,
    ) -> Result<Vec<BundleRecommendationDto>, ApiError> {
        self.record(ApiCall::Bundles {
            ctx: ctx.clone(),
            sku: sku.to_owned(),
        });
        self.bundles.get(sku).cloned().unwrap_or_else(|| Ok(Vec::new()))
    }

    fn chat(&self, ctx: &RequestContext, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        self.record(ApiCall::Chat {
            ctx: ctx.clone(),
            request: request.clone(),
        });
        self.chat.clone()
    }

    fn health(&self, ctx: &RequestContext) -> Result<HealthResponse, ApiError> {
        self.record(ApiCall::Health(ctx.clone()));
        self.health.clone()
    }
}
