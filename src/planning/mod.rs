//! Topology planning logic.
//!
//! This module turns a base block, an AZ list, a tier layout and a toggle
//! set into a [`TopologyPlan`](crate::models::TopologyPlan):
//! - [`layout`] - carving tier subnets and proving tier runs disjoint
//! - [`overlap`] - pairwise overlap validation of the final subnet set
//! - [`routing`] - NAT placement, default routes, control-plane path
//! - [`free_space`] - space left unallocated in the base block
//! - [`planner`] - the `plan` entry points

pub mod free_space;
pub mod layout;
pub mod overlap;
pub mod planner;
pub mod routing;

// Re-export public functions
pub use free_space::{free_addresses, free_blocks};
pub use layout::{PRIVATE_PREFIX_MAX, PRIVATE_PREFIX_MIN};
pub use overlap::{find_overlapping_subnets, OverlapConflict};
pub use planner::{plan, plan_block, MIN_AVAILABILITY_ZONES};
