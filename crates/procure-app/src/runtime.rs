// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::VecDeque;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::assistant::{AssistantCommand, AssistantEffect, AssistantState};
use crate::dashboard::{DashboardCommand, DashboardEffect, DashboardState};
use crate::error::{ApiError, Failure};
use crate::identity::{Identity, RequestContext, Session};
use crate::ids::Ticket;
use crate::model::{
    BundleRecommendationDto, ChatRequest, ChatResponse, DemoLoadResponse, HealthResponse,
    ReorderPredictionDto,
};

/// The remote insights service as the view-models see it.
pub trait InsightsApi {
    fn load_demo_data(&self, ctx: &RequestContext) -> Result<DemoLoadResponse, ApiError>;
    fn reorders(
        &self,
        ctx: &RequestContext,
        limit: usize,
    ) -> Result<Vec<ReorderPredictionDto>, ApiError>;
    fn bundles(
        &self,
        ctx: &RequestContext,
        sku: &str,
    ) -> Result<Vec<BundleRecommendationDto>, ApiError>;
    fn chat(&self, ctx: &RequestContext, request: &ChatRequest) -> Result<ChatResponse, ApiError>;
    fn health(&self, ctx: &RequestContext) -> Result<HealthResponse, ApiError>;
}

impl<A: InsightsApi + ?Sized> InsightsApi for &A {
    fn load_demo_data(&self, ctx: &RequestContext) -> Result<DemoLoadResponse, ApiError> {
        (**self).load_demo_data(ctx)
    }

    fn reorders(
        &self,
        ctx: &RequestContext,
        limit: usize,
    ) -> Result<Vec<ReorderPredictionDto>, ApiError> {
        (**self).reorders(ctx, limit)
    }

    fn bundles(
        &self,
        ctx: &RequestContext,
        sku: &str,
    ) -> Result<Vec<BundleRecommendationDto>, ApiError> {
        (**self).bundles(ctx, sku)
    }

    fn chat(&self, ctx: &RequestContext, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        (**self).chat(ctx, request)
    }

    fn health(&self, ctx: &RequestContext) -> Result<HealthResponse, ApiError> {
        (**self).health(ctx)
    }
}

/// A queued request. The context is captured when the request is issued,
/// so later identity or demo-mode changes never reach it.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Job {
    LoadDemo {
        ticket: Ticket,
        ctx: RequestContext,
    },
    FetchReorders {
        ticket: Ticket,
        ctx: RequestContext,
        limit: usize,
    },
    FetchBundles {
        ticket: Ticket,
        ctx: RequestContext,
        sku: String,
    },
    SendChat {
        ticket: Ticket,
        ctx: RequestContext,
        request: ChatRequest,
    },
}

/// Single-threaded driver for both view-models. Commands queue their
/// requests; `step` runs the oldest one and feeds its completion back.
pub struct Runtime<A> {
    api: A,
    session: Session,
    dashboard: DashboardState,
    assistant: AssistantState,
    pending: VecDeque<Job>,
    clock: fn() -> OffsetDateTime,
}

impl<A: InsightsApi> Runtime<A> {
    pub fn new(api: A, session: Session, reorder_limit: usize) -> Self {
        Self::with_clock(api, session, reorder_limit, OffsetDateTime::now_utc)
    }

    pub fn with_clock(
        api: A,
        session: Session,
        reorder_limit: usize,
        clock: fn() -> OffsetDateTime,
    ) -> Self {
        let dashboard = DashboardState::new(session.identity().clone(), reorder_limit);
        Self {
            api,
            session,
            dashboard,
            assistant: AssistantState::new(clock()),
            pending: VecDeque::new(),
            clock,
        }
    }

    pub fn with_assistant(mut self, assistant: AssistantState) -> Self {
        self.assistant = assistant;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn dashboard(&self) -> &DashboardState {
        &self.dashboard
    }

    pub fn assistant(&self) -> &AssistantState {
        &self.assistant
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    pub fn set_use_cached_ai(&mut self, enabled: bool) {
        self.session.set_use_cached_ai(enabled);
    }

    pub fn dispatch_dashboard(&mut self, command: DashboardCommand) {
        let effects = self.dashboard.dispatch(command, (self.clock)());
        self.apply_dashboard_effects(effects);
    }

    pub fn dispatch_assistant(&mut self, command: AssistantCommand) {
        let effects = self.assistant.dispatch(command, (self.clock)());
        for effect in effects {
            match effect {
                AssistantEffect::SendChat { ticket, request } => {
                    let ctx = self.session.context();
                    self.pending.push_back(Job::SendChat {
                        ticket,
                        ctx,
                        request,
                    });
                }
            }
        }
    }

    /// Runs the oldest queued request. Returns false when nothing was queued.
    pub fn step(&mut self) -> bool {
        let Some(job) = self.pending.pop_front() else {
            return false;
        };
        self.run(job);
        true
    }

    /// Runs queued requests, including the ones their completions enqueue,
    /// until the queue is empty. Returns how many requests were issued.
    pub fn run_pending(&mut self) -> usize {
        let mut issued = 0;
        while self.step() {
            issued += 1;
        }
        issued
    }

    pub fn check_health(&self) -> Result<HealthResponse, ApiError> {
        self.api.health(&self.session.context())
    }

    fn apply_dashboard_effects(&mut self, effects: Vec<DashboardEffect>) {
        for effect in effects {
            let job = match effect {
                DashboardEffect::IdentityChanged(identity) => {
                    debug!(
                        org_id = %identity.org_id,
                        role = %identity.role,
                        "identity updated"
                    );
                    self.session.replace_identity(identity);
                    continue;
                }
                DashboardEffect::LoadDemo { ticket, identity } => Job::LoadDemo {
                    ticket,
                    ctx: self.snapshot(identity),
                },
                DashboardEffect::FetchReorders {
                    ticket,
                    identity,
                    limit,
                } => Job::FetchReorders {
                    ticket,
                    ctx: self.snapshot(identity),
                    limit,
                },
                DashboardEffect::FetchBundles {
                    ticket,
                    identity,
                    sku,
                } => Job::FetchBundles {
                    ticket,
                    ctx: self.snapshot(identity),
                    sku,
                },
            };
            self.pending.push_back(job);
        }
    }

    fn snapshot(&self, identity: Identity) -> RequestContext {
        RequestContext::new(identity, self.session.demo_mode())
    }

    fn run(&mut self, job: Job) {
        match job {
            Job::LoadDemo { ticket, ctx } => {
                debug!(%ticket, org_id = %ctx.identity.org_id, "loading demo data");
                let result = self.api.load_demo_data(&ctx).map_err(failed("demo load"));
                self.dispatch_dashboard(DashboardCommand::DemoLoaded { ticket, result });
            }
            Job::FetchReorders { ticket, ctx, limit } => {
                debug!(
                    %ticket,
                    org_id = %ctx.identity.org_id,
                    limit,
                    "fetching reorder predictions"
                );
                let result = self.api.reorders(&ctx, limit).map_err(failed("reorder fetch"));
                self.dispatch_dashboard(DashboardCommand::ReordersLoaded { ticket, result });
            }
            Job::FetchBundles { ticket, ctx, sku } => {
                debug!(%ticket, %sku, "fetching bundle recommendations");
                let result = self.api.bundles(&ctx, &sku).map_err(failed("bundle fetch"));
                self.dispatch_dashboard(DashboardCommand::BundlesLoaded { ticket, result });
            }
            Job::SendChat {
                ticket,
                ctx,
                request,
            } => {
                debug!(%ticket, org_id = %ctx.identity.org_id, "sending assistant prompt");
                let result = self.api.chat(&ctx, &request).map_err(failed("assistant chat"));
                self.dispatch_assistant(AssistantCommand::ChatCompleted { ticket, result });
            }
        }
    }
}

fn failed(what: &'static str) -> impl Fn(ApiError) -> Failure {
    move |error| {
        warn!(%error, status = ?error.status(), "{what} failed");
        Failure::Api(error)
    }
}
