// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod assistant;
pub mod dashboard;
pub mod error;
pub mod format;
pub mod identity;
pub mod ids;
pub mod model;
pub mod runtime;

pub use assistant::*;
pub use dashboard::*;
pub use error::*;
pub use format::*;
pub use identity::*;
pub use ids::*;
pub use model::*;
pub use runtime::*;
