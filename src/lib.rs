//! Deterministic subnet and routing planner for multi-tier private networks.
//!
//! Given a base IPv4 block, an ordered list of availability zones, per-tier
//! sizing and a set of feature toggles, [`planning::plan`] carves
//! non-overlapping private, public and endpoint subnets, binds them to zones
//! positionally, and derives NAT / internet gateway / PrivateLink routing.
//!
//! - [`models`] - CIDR blocks, tiers, toggles and the plan itself
//! - [`planning`] - the planner
//! - [`config`] - plan request files and environment overrides
//! - [`output`] - CSV and JSON rendering

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod planning;

pub use config::PlanRequest;
pub use error::{ConfigError, PlanError};
pub use planning::{plan, plan_block};
