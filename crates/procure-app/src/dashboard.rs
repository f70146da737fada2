// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;
use tracing::debug;

use crate::error::{Failure, UNKNOWN_ERROR};
use crate::format::confidence_color;
use crate::identity::Identity;
use crate::ids::{Ticket, TicketCounter};
use crate::model::{
    BundleCard, BundleRecommendationDto, DemoLoadResponse, ReorderPredictionDto, ReorderRow,
    ViewMode,
};

pub const DEFAULT_REORDER_LIMIT: usize = 20;
pub const CHART_ROW_LIMIT: usize = 10;

pub const INITIAL_INFO: &str = "No data loaded yet. Pick an org and click \"Load Demo Data\".";
const DEMO_LOAD_FAILED_INFO: &str = "Unable to load demo data.";
const BUNDLE_REFRESH_FAILED: &str = "Unable to refresh bundle recommendations.";
const EMPTY_TABLE_INFO: &str =
    "No reorder predictions yet. Upload or load demo data to populate the table.";
const CLEAR_DATA_INFO: &str =
    "CSV upload UI coming soon. Demo data cleared so you can start from a clean slate.";

/// Where a request-backed section currently stands. Loading and failure are
/// distinct phases, so a section can never show both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Loading(Ticket),
    Ready,
    Failed(String),
}

impl Phase {
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Whether a completion carrying `ticket` is still the one this section
    /// waits for.
    pub fn accepts(&self, ticket: Ticket) -> bool {
        matches!(self, Self::Loading(current) if *current == ticket)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DemoLoadSection {
    pub phase: Phase,
    pub last_loaded_at: Option<OffsetDateTime>,
    pub imported_rows: Option<u64>,
}

impl DemoLoadSection {
    fn loading(self, ticket: Ticket) -> Self {
        Self {
            phase: Phase::Loading(ticket),
            ..self
        }
    }

    fn loaded(response: &DemoLoadResponse, at: OffsetDateTime) -> Self {
        Self {
            phase: Phase::Ready,
            last_loaded_at: Some(at),
            imported_rows: Some(response.imported_rows),
        }
    }

    fn failed(self, message: String) -> Self {
        Self {
            phase: Phase::Failed(message),
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSection {
    pub phase: Phase,
    pub rows: Vec<ReorderRow>,
    pub selected_sku: Option<String>,
}

impl TableSection {
    fn loading(self, ticket: Ticket) -> Self {
        Self {
            phase: Phase::Loading(ticket),
            ..self
        }
    }

    fn loaded(rows: Vec<ReorderRow>) -> Self {
        let selected_sku = rows
            .first()
            .map(|row| row.sku.clone())
            .filter(|sku| !sku.is_empty());
        Self {
            phase: Phase::Ready,
            rows,
            selected_sku,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            phase: Phase::Failed(message),
            rows: Vec::new(),
            selected_sku: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleSection {
    pub phase: Phase,
    pub sku: Option<String>,
    pub cards: Vec<BundleCard>,
}

impl BundleSection {
    fn loading(sku: String, ticket: Ticket) -> Self {
        Self {
            phase: Phase::Loading(ticket),
            sku: Some(sku),
            cards: Vec::new(),
        }
    }

    fn loaded(self, cards: Vec<BundleCard>) -> Self {
        Self {
            phase: Phase::Ready,
            cards,
            ..self
        }
    }

    fn failed(self, message: String) -> Self {
        Self {
            phase: Phase::Failed(message),
            cards: Vec::new(),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardCommand {
    LoadDemoData,
    SelectOrg(String),
    SelectRole(String),
    SelectRow(String),
    ClearData,
    SetViewMode(ViewMode),
    DemoLoaded {
        ticket: Ticket,
        result: Result<DemoLoadResponse, Failure>,
    },
    ReordersLoaded {
        ticket: Ticket,
        result: Result<Vec<ReorderPredictionDto>, Failure>,
    },
    BundlesLoaded {
        ticket: Ticket,
        result: Result<Vec<BundleRecommendationDto>, Failure>,
    },
}

/// Work the dashboard asks its runtime to perform. Fetches carry the
/// identity that was current when they were issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEffect {
    IdentityChanged(Identity),
    LoadDemo {
        ticket: Ticket,
        identity: Identity,
    },
    FetchReorders {
        ticket: Ticket,
        identity: Identity,
        limit: usize,
    },
    FetchBundles {
        ticket: Ticket,
        identity: Identity,
        sku: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    identity: Identity,
    reorder_limit: usize,
    info_message: Option<String>,
    view_mode: ViewMode,
    demo: DemoLoadSection,
    table: TableSection,
    bundles: BundleSection,
    tickets: TicketCounter,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(Identity::default(), DEFAULT_REORDER_LIMIT)
    }
}

impl DashboardState {
    pub fn new(identity: Identity, reorder_limit: usize) -> Self {
        Self {
            identity,
            reorder_limit,
            info_message: Some(INITIAL_INFO.to_owned()),
            view_mode: ViewMode::default(),
            demo: DemoLoadSection::default(),
            table: TableSection::default(),
            bundles: BundleSection::default(),
            tickets: TicketCounter::default(),
        }
    }

    pub fn dispatch(
        &mut self,
        command: DashboardCommand,
        now: OffsetDateTime,
    ) -> Vec<DashboardEffect> {
        match command {
            DashboardCommand::LoadDemoData => self.load_demo_data(),
            DashboardCommand::SelectOrg(org_id) => self.select_org(org_id),
            DashboardCommand::SelectRole(role) => self.select_role(role),
            DashboardCommand::SelectRow(sku) => {
                self.table.selected_sku = Some(sku).filter(|sku| !sku.is_empty());
                self.start_bundle_fetch(self.table.selected_sku.clone())
            }
            DashboardCommand::ClearData => {
                if !self.is_busy() {
                    self.reset(CLEAR_DATA_INFO.to_owned());
                }
                Vec::new()
            }
            DashboardCommand::SetViewMode(mode) => {
                self.view_mode = mode;
                Vec::new()
            }
            DashboardCommand::DemoLoaded { ticket, result } => {
                self.demo_loaded(ticket, result, now)
            }
            DashboardCommand::ReordersLoaded { ticket, result } => {
                self.reorders_loaded(ticket, result, now)
            }
            DashboardCommand::BundlesLoaded { ticket, result } => {
                self.bundles_loaded(ticket, result);
                Vec::new()
            }
        }
    }

    fn load_demo_data(&mut self) -> Vec<DashboardEffect> {
        if self.demo.phase.is_loading() {
            return Vec::new();
        }
        let ticket = self.tickets.issue();
        self.begin_refresh(format!("Loading demo data for {}…", self.identity.org_id));
        self.demo = std::mem::take(&mut self.demo).loading(ticket);
        vec![DashboardEffect::LoadDemo {
            ticket,
            identity: self.identity.clone(),
        }]
    }

    fn demo_loaded(
        &mut self,
        ticket: Ticket,
        result: Result<DemoLoadResponse, Failure>,
        now: OffsetDateTime,
    ) -> Vec<DashboardEffect> {
        if !self.demo.phase.accepts(ticket) {
            debug!(%ticket, "discarding stale demo-load completion");
            return Vec::new();
        }
        match result {
            Ok(response) => {
                self.demo = DemoLoadSection::loaded(&response, now);
                self.info_message = Some(format!(
                    "Loaded {} demo rows for {}.",
                    response.imported_rows, response.org_id
                ));
                self.start_table_fetch()
            }
            Err(failure) => {
                let message = failure.describe(UNKNOWN_ERROR);
                self.demo = std::mem::take(&mut self.demo).failed(message.clone());
                self.info_message = Some(DEMO_LOAD_FAILED_INFO.to_owned());
                self.table = TableSection::failed(message);
                self.bundles = BundleSection::default().failed(BUNDLE_REFRESH_FAILED.to_owned());
                Vec::new()
            }
        }
    }

    fn start_table_fetch(&mut self) -> Vec<DashboardEffect> {
        let ticket = self.tickets.issue();
        self.table = std::mem::take(&mut self.table).loading(ticket);
        self.bundles = BundleSection::default();
        vec![DashboardEffect::FetchReorders {
            ticket,
            identity: self.identity.clone(),
            limit: self.reorder_limit,
        }]
    }

    fn reorders_loaded(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<ReorderPredictionDto>, Failure>,
        now: OffsetDateTime,
    ) -> Vec<DashboardEffect> {
        if !self.table.phase.accepts(ticket) {
            debug!(%ticket, "discarding stale reorder completion");
            return Vec::new();
        }
        match result {
            Ok(items) => {
                let rows = items
                    .into_iter()
                    .map(|item| ReorderRow::from_prediction(item, now))
                    .collect();
                self.table = TableSection::loaded(rows);
                if self.table.rows.is_empty() {
                    self.info_message = Some(EMPTY_TABLE_INFO.to_owned());
                }
                self.start_bundle_fetch(self.table.selected_sku.clone())
            }
            Err(failure) => {
                self.table = TableSection::failed(failure.describe(UNKNOWN_ERROR));
                self.bundles = BundleSection::default();
                Vec::new()
            }
        }
    }

    fn start_bundle_fetch(&mut self, sku: Option<String>) -> Vec<DashboardEffect> {
        self.bundles = BundleSection::default();
        let Some(sku) = sku.filter(|sku| !sku.is_empty()) else {
            return Vec::new();
        };
        let ticket = self.tickets.issue();
        self.bundles = BundleSection::loading(sku.clone(), ticket);
        vec![DashboardEffect::FetchBundles {
            ticket,
            identity: self.identity.clone(),
            sku,
        }]
    }

    fn bundles_loaded(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<BundleRecommendationDto>, Failure>,
    ) {
        if !self.bundles.phase.accepts(ticket) {
            debug!(%ticket, "discarding stale bundle completion");
            return;
        }
        let section = std::mem::take(&mut self.bundles);
        self.bundles = match result {
            Ok(items) => section.loaded(items.into_iter().map(BundleCard::from).collect()),
            Err(failure) => section.failed(failure.describe(UNKNOWN_ERROR)),
        };
    }

    fn select_org(&mut self, org_id: String) -> Vec<DashboardEffect> {
        if self.table.phase.is_loading() || org_id == self.identity.org_id {
            return Vec::new();
        }
        let message = format!(
            "Switched to {org_id}. Load demo data or upload a CSV to continue."
        );
        self.identity.org_id = org_id;
        self.reset(message);
        vec![DashboardEffect::IdentityChanged(self.identity.clone())]
    }

    fn select_role(&mut self, role: String) -> Vec<DashboardEffect> {
        if self.is_busy() || role == self.identity.role {
            return Vec::new();
        }
        self.info_message = Some(format!(
            "Role switched to {role}. Controls will adapt as features unlock."
        ));
        self.identity.role = role;
        vec![DashboardEffect::IdentityChanged(self.identity.clone())]
    }

    /// Drops every section back to idle. Completions still in flight no
    /// longer match and are discarded when they arrive.
    fn reset(&mut self, message: String) {
        self.demo = DemoLoadSection::default();
        self.begin_refresh(message);
    }

    fn begin_refresh(&mut self, message: String) {
        self.table = TableSection::default();
        self.bundles = BundleSection::default();
        self.info_message = Some(message);
    }

    fn is_busy(&self) -> bool {
        self.demo.phase.is_loading() || self.table.phase.is_loading()
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn reorder_limit(&self) -> usize {
        self.reorder_limit
    }

    pub fn info_message(&self) -> Option<&str> {
        self.info_message.as_deref()
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn demo(&self) -> &DemoLoadSection {
        &self.demo
    }

    pub fn table(&self) -> &TableSection {
        &self.table
    }

    pub fn bundles(&self) -> &BundleSection {
        &self.bundles
    }

    pub fn last_loaded_at(&self) -> Option<OffsetDateTime> {
        self.demo.last_loaded_at
    }

    pub fn is_loading_demo(&self) -> bool {
        self.demo.phase.is_loading()
    }

    pub fn table_loading(&self) -> bool {
        self.table.phase.is_loading()
    }

    pub fn table_error(&self) -> Option<&str> {
        self.table.phase.error()
    }

    pub fn bundle_loading(&self) -> bool {
        self.bundles.phase.is_loading()
    }

    pub fn bundle_error(&self) -> Option<&str> {
        self.bundles.phase.error()
    }

    pub fn rows(&self) -> &[ReorderRow] {
        &self.table.rows
    }

    pub fn has_data(&self) -> bool {
        !self.table.rows.is_empty()
    }

    pub fn selected_sku(&self) -> Option<&str> {
        self.table.selected_sku.as_deref()
    }

    pub fn selected_row(&self) -> Option<&ReorderRow> {
        let sku = self.selected_sku()?;
        self.table.rows.iter().find(|row| row.sku == sku)
    }

    pub fn is_selected(&self, row: &ReorderRow) -> bool {
        self.selected_sku() == Some(row.sku.as_str())
    }

    /// Cards for the current selection; empty when the bundle section belongs
    /// to some other sku.
    pub fn bundles_for_selection(&self) -> &[BundleCard] {
        if self.bundles.sku.as_deref() != self.selected_sku() {
            return &[];
        }
        &self.bundles.cards
    }

    pub fn max_last_quantity(&self) -> i64 {
        self.table
            .rows
            .iter()
            .map(|row| row.last_quantity)
            .max()
            .unwrap_or(0)
            .max(1)
    }

    pub fn chart_rows(&self) -> &[ReorderRow] {
        let end = self.table.rows.len().min(CHART_ROW_LIMIT);
        &self.table.rows[..end]
    }

    pub fn bar_height(&self, row: &ReorderRow) -> f64 {
        if row.last_quantity == 0 {
            return 20.0;
        }
        let ratio = row.last_quantity as f64 / self.max_last_quantity() as f64;
        (20.0 + ratio * 80.0).max(10.0)
    }

    pub fn bar_color(&self, row: &ReorderRow) -> String {
        confidence_color(row.confidence)
    }
}
