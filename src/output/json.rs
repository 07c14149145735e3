//! JSON output for topology plans.

use crate::models::{Ipv4, TopologyPlan};
use crate::planning::free_space::{free_addresses, free_blocks};
use serde::Serialize;
use std::error::Error;

#[derive(Serialize)]
struct PlanDocument<'a> {
    plan: &'a TopologyPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    free_blocks: Option<Vec<Ipv4>>,
    free_addresses: u64,
}

/// Render a plan as pretty printed JSON.
pub fn plan_json(plan: &TopologyPlan, include_free: bool) -> Result<String, Box<dyn Error>> {
    let document = PlanDocument {
        plan,
        free_blocks: if include_free { Some(free_blocks(plan)?) } else { None },
        free_addresses: free_addresses(plan),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}
