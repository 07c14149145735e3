//! Domain models for the network topology planner.
//!
//! This module contains the core data structures used throughout the crate:
//! - [`Ipv4`] - IPv4 address block with CIDR arithmetic
//! - [`SubnetTier`], [`TierSpec`] and [`TierLayout`] - tier sizing
//! - [`ToggleConfig`] and [`FeatureToggles`] - deployment feature flags
//! - [`Subnet`] and [`TopologyPlan`] - planner output

mod ipv4;
mod subnet;
mod tier;
mod toggles;
mod topology;

// Re-export public types
pub use ipv4::{get_cidr_mask, lo_mask, usable_hosts, CidrError, Ipv4, MAX_LENGTH, RESERVED_HOSTS};
pub use subnet::Subnet;
pub use tier::{SubnetTier, TierLayout, TierSpec};
pub use toggles::{FeatureToggles, NatMode, ToggleConfig};
pub use topology::{ControlPlanePath, NatGateway, RouteFact, RouteTarget, Routing, TopologyPlan};
