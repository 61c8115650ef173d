// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod dashboard;
pub mod eligibility;
pub mod forms;
pub mod ids;
pub mod inventory;
pub mod list;
pub mod model;
pub mod requests;
pub mod state;

pub use dashboard::*;
pub use eligibility::*;
pub use forms::*;
pub use ids::*;
pub use inventory::*;
pub use list::*;
pub use model::*;
pub use requests::*;
pub use state::*;
