//! Terminal output utilities.
//!
//! Provides formatting helpers for terminal output.

use crate::models::{ControlPlanePath, TopologyPlan};
use colored::{ColoredString, Colorize};

/// Format a value as a quoted, right-aligned field.
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let quoted = format!("\"{}\"", value.to_string());
    format!("{quoted:>width$}")
}

/// Colored label for the control-plane path.
pub fn control_plane_label(path: ControlPlanePath) -> ColoredString {
    match path {
        ControlPlanePath::PrivateLink => "privatelink".green(),
        ControlPlanePath::Nat => "nat".yellow(),
        ControlPlanePath::Unrouted => "unrouted".red(),
    }
}

/// One line summary of a plan.
pub fn plan_summary(plan: &TopologyPlan) -> String {
    format!(
        "base={} azs={} subnets={} nat={} igw={} control_plane={} frontend_privatelink={}",
        plan.base(),
        plan.availability_zones().join(","),
        plan.subnets().len(),
        plan.nat_gateways().len(),
        plan.has_internet_gateway(),
        control_plane_label(plan.control_plane()),
        plan.privatelink_frontend()
    )
}
