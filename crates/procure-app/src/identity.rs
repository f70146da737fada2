// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub const ORG_OPTIONS: [&str; 2] = ["demo-org-a", "demo-org-b"];
pub const DEFAULT_ORG_ID: &str = "demo-org-a";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Buyer,
    Admin,
}

impl Role {
    pub const ALL: [Self; 2] = [Self::Buyer, Self::Admin];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "BUYER",
            Self::Admin => "ADMIN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "BUYER" => Some(Self::Buyer),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Who the outgoing requests are made on behalf of. Values are taken as-is;
/// the server is the one that rejects unknown orgs or roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub org_id: String,
    pub role: String,
}

impl Identity {
    pub fn new(org_id: &str, role: &str) -> Self {
        Self {
            org_id: org_id.to_owned(),
            role: role.to_owned(),
        }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new(DEFAULT_ORG_ID, Role::Buyer.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DemoMode {
    use_cached_ai: bool,
}

impl DemoMode {
    pub const fn new(use_cached_ai: bool) -> Self {
        Self { use_cached_ai }
    }

    pub const fn use_cached_ai(self) -> bool {
        self.use_cached_ai
    }

    pub fn set_use_cached_ai(&mut self, enabled: bool) {
        self.use_cached_ai = enabled;
    }
}

/// Metadata snapshot attached to a single outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub identity: Identity,
    pub use_cached_ai: bool,
}

impl RequestContext {
    pub fn new(identity: Identity, demo_mode: DemoMode) -> Self {
        Self {
            identity,
            use_cached_ai: demo_mode.use_cached_ai(),
        }
    }
}

/// Identity and demo mode for the current session, shared by the dashboard
/// and the assistant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    identity: Identity,
    demo_mode: DemoMode,
}

impl Session {
    pub fn new(identity: Identity, demo_mode: DemoMode) -> Self {
        Self {
            identity,
            demo_mode,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn update(&mut self, org_id: &str, role: &str) {
        self.identity = Identity::new(org_id, role);
    }

    pub fn replace_identity(&mut self, identity: Identity) {
        self.identity = identity;
    }

    pub fn demo_mode(&self) -> DemoMode {
        self.demo_mode
    }

    pub fn set_use_cached_ai(&mut self, enabled: bool) {
        self.demo_mode.set_use_cached_ai(enabled);
    }

    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.identity.clone(), self.demo_mode)
    }
}
