// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;

use crate::format::{days_from_now, format_date};

pub const DEFAULT_EXPLANATION: &str = "This recommendation follows the cadence shown above.";
pub const DEFAULT_RATIONALE: &str = "Often ordered together based on past purchases.";

/// Treats an explicit JSON `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoLoadResponse {
    #[serde(default, deserialize_with = "nullable")]
    pub org_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub imported_rows: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderPredictionDto {
    #[serde(default, deserialize_with = "nullable")]
    pub org_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub sku: String,
    #[serde(default, deserialize_with = "nullable")]
    pub product_name: String,
    #[serde(default)]
    pub last_purchase_at: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub median_days_between: i64,
    #[serde(default)]
    pub predicted_reorder_at: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub confidence: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub last_quantity: i64,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleRecommendationDto {
    #[serde(default, deserialize_with = "nullable")]
    pub org_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub sku: String,
    #[serde(default, deserialize_with = "nullable")]
    pub related_sku: String,
    #[serde(default, deserialize_with = "nullable")]
    pub related_name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub co_purchase_count: i64,
    #[serde(default)]
    pub rationale: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<String>,
}

impl ChatContext {
    pub const fn is_empty(&self) -> bool {
        self.selected_sku.is_none() && self.org_type.is_none() && self.project_type.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ChatContext>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListItem {
    #[serde(default, deserialize_with = "nullable")]
    pub sku: String,
    #[serde(default, deserialize_with = "nullable")]
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub qty: i64,
    #[serde(default, deserialize_with = "nullable")]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(default)]
    pub reply_text: Option<String>,
    #[serde(default)]
    pub shopping_list: Option<Vec<ShoppingListItem>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    #[serde(rename = "UP")]
    Up,
    #[serde(rename = "DOWN")]
    Down,
}

impl HealthStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(default, deserialize_with = "nullable")]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReorderRow {
    pub sku: String,
    pub name: String,
    pub last_quantity: i64,
    pub predicted_date: String,
    pub days_until: i64,
    pub confidence: f64,
    pub last_purchase: String,
    pub cadence: String,
    pub explanation: String,
}

impl ReorderRow {
    pub fn from_prediction(item: ReorderPredictionDto, now: OffsetDateTime) -> Self {
        let predicted = item.predicted_reorder_at.as_deref();
        Self {
            predicted_date: format_date(predicted),
            days_until: days_from_now(predicted, now),
            last_purchase: format_date(item.last_purchase_at.as_deref()),
            cadence: format!("{} day cadence", item.median_days_between),
            explanation: item
                .explanation
                .unwrap_or_else(|| DEFAULT_EXPLANATION.to_owned()),
            sku: item.sku,
            name: item.product_name,
            last_quantity: item.last_quantity,
            confidence: item.confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleCard {
    pub related_sku: String,
    pub related_name: String,
    pub count: i64,
    pub rationale: String,
}

impl From<BundleRecommendationDto> for BundleCard {
    fn from(item: BundleRecommendationDto) -> Self {
        Self {
            related_sku: item.related_sku,
            related_name: item.related_name,
            count: item.co_purchase_count,
            rationale: item
                .rationale
                .unwrap_or_else(|| DEFAULT_RATIONALE.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

impl ChatRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Assistant => "ASSISTANT",
            Self::System => "SYSTEM",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChatVariant {
    #[default]
    Default,
    Error,
    Fallback,
}

impl ChatVariant {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Error => "error",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
    pub timestamp: OffsetDateTime,
    pub variant: ChatVariant,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Table,
    Chart,
}
