// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use procure_app::{
    AssistantState, ChatRole, ChatVariant, DashboardState, HealthResponse, ViewMode,
    format_clock, format_timestamp,
};
use std::fmt::Write as _;

const BAR_WIDTH: f64 = 40.0;

pub fn health(response: &HealthResponse) -> String {
    format!(
        "status: {}\ntimestamp: {}\n",
        response.status.as_str(),
        response.timestamp
    )
}

pub fn dashboard(state: &DashboardState) -> String {
    let mut out = String::new();
    let identity = state.identity();
    let _ = writeln!(out, "org: {} ({})", identity.org_id, identity.role);
    if let Some(info) = state.info_message() {
        let _ = writeln!(out, "{info}");
    }
    if let Some(loaded_at) = state.last_loaded_at() {
        let _ = writeln!(out, "last loaded: {}", format_timestamp(loaded_at));
    }
    if let Some(error) = state.table_error() {
        let _ = writeln!(out, "reorders unavailable: {error}");
    }
    if !state.has_data() {
        return out;
    }

    out.push('\n');
    match state.view_mode() {
        ViewMode::Table => reorder_table(state, &mut out),
        ViewMode::Chart => quantity_chart(state, &mut out),
    }

    out.push('\n');
    bundles(state, &mut out);
    out
}

fn reorder_table(state: &DashboardState, out: &mut String) {
    let _ = writeln!(
        out,
        "  {:<12} {:<28} {:>5}  {:<10} {:>5}  {:>4}  {:<16} {}",
        "SKU", "PRODUCT", "QTY", "NEXT", "DAYS", "CONF", "CADENCE", "LAST"
    );
    for row in state.rows() {
        let marker = if state.is_selected(row) { '>' } else { ' ' };
        let _ = writeln!(
            out,
            "{marker} {:<12} {:<28} {:>5}  {:<10} {:>5}  {:>4.2}  {:<16} {}",
            row.sku,
            row.name,
            row.last_quantity,
            row.predicted_date,
            row.days_until,
            row.confidence,
            row.cadence,
            row.last_purchase
        );
    }
    if let Some(row) = state.selected_row() {
        let _ = writeln!(out, "\n{}: {}", row.sku, row.explanation);
    }
}

fn quantity_chart(state: &DashboardState, out: &mut String) {
    let _ = writeln!(out, "last order quantity (max {})", state.max_last_quantity());
    for row in state.chart_rows() {
        let width = (state.bar_height(row) / 100.0 * BAR_WIDTH).round() as usize;
        let _ = writeln!(
            out,
            "  {:<12} {:<40} {:>5}  {}",
            row.sku,
            "#".repeat(width),
            row.last_quantity,
            state.bar_color(row)
        );
    }
}

fn bundles(state: &DashboardState, out: &mut String) {
    let Some(sku) = state.selected_sku() else {
        return;
    };
    let _ = writeln!(out, "bundles for {sku}:");
    if state.bundle_loading() {
        let _ = writeln!(out, "  loading...");
        return;
    }
    if let Some(error) = state.bundle_error() {
        let _ = writeln!(out, "  {error}");
        return;
    }
    let cards = state.bundles_for_selection();
    if cards.is_empty() {
        let _ = writeln!(out, "  none");
    }
    for card in cards {
        let _ = writeln!(
            out,
            "  {} {} (bought together {}x): {}",
            card.related_sku, card.related_name, card.count, card.rationale
        );
    }
}

pub fn assistant(state: &AssistantState) -> String {
    let mut out = String::new();
    for message in state.conversation() {
        let label = match (message.role, message.variant) {
            (ChatRole::Assistant, ChatVariant::Fallback) => "ASSISTANT (cached)",
            (role, _) => role.as_str(),
        };
        let _ = writeln!(
            out,
            "[{}] {label}: {}",
            format_clock(message.timestamp),
            message.text
        );
    }
    if let Some(error) = state.error_message() {
        let _ = writeln!(out, "\nerror: {error}");
    }

    let list = state.shopping_list();
    if !list.is_empty() {
        let _ = writeln!(out, "\nshopping list:");
        for item in list {
            let _ = writeln!(
                out,
                "  {:>3} x {:<12} {} ({})",
                item.qty, item.sku, item.name, item.reason
            );
        }
    }
    if state.show_fallback_indicator() {
        let _ = writeln!(out, "\nfallback mode: reply served from the cached kit");
    }
    out
}
