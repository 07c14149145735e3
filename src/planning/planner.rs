//! Planning entry points.

use super::layout::{check_private_size, layout_subnets};
use super::overlap::{validate_disjoint, validate_within};
use super::routing::derive_routing;
use crate::error::PlanError;
use crate::models::{
    CidrError, FeatureToggles, Ipv4, SubnetTier, TierLayout, TierSpec, TopologyPlan,
};
use std::collections::HashSet;

/// Workloads must span at least this many failure domains.
pub const MIN_AVAILABILITY_ZONES: usize = 2;

/// Plan a topology from a base block given in CIDR notation.
///
/// Pure and deterministic: equal inputs always give equal plans, and no
/// partial plan is ever returned.
///
/// # Examples
/// ```
/// use network_topology_planner::models::{FeatureToggles, SubnetTier, TierLayout};
/// use network_topology_planner::planning::plan;
///
/// let tiers = TierLayout::new()
///     .with(SubnetTier::Private, 2)
///     .with(SubnetTier::Public, 4);
/// let plan = plan(
///     "10.0.0.0/24",
///     &["us-east-1a", "us-east-1b"],
///     &tiers,
///     &FeatureToggles::premium_simulation(),
/// )
/// .unwrap();
/// assert_eq!(plan.subnets()[1].cidr.to_string(), "10.0.0.64/26");
/// assert_eq!(plan.subnets()[2].cidr.to_string(), "10.0.0.128/28");
/// ```
pub fn plan<S: AsRef<str>>(
    base: &str,
    azs: &[S],
    tiers: &TierLayout,
    toggles: &FeatureToggles,
) -> Result<TopologyPlan, PlanError> {
    let block = Ipv4::network(base).map_err(|source| PlanError::InvalidAddressBlock {
        input: base.to_string(),
        source,
    })?;
    plan_block(block, azs, tiers, toggles)
}

/// Plan a topology from an already parsed base block.
///
/// Checks run in a fixed order and the first failure is returned: the base
/// must be a network address, the AZ list must hold at least
/// [`MIN_AVAILABILITY_ZONES`] distinct names, the private tier (and the public
/// tier when NAT is on) must be present, and the private prefix must lie in
/// `/17..=/26`. Only then are subnets carved and routing derived.
///
/// # Arguments
/// * `base` - The root allocation, without host bits
/// * `azs` - Ordered availability zones, consumed positionally
/// * `tiers` - Per-tier new bits and optional offsets
/// * `toggles` - Validated feature toggles
///
/// # Returns
/// * `Ok(TopologyPlan)` - Subnets plus NAT, internet gateway and control-plane facts
/// * `Err(PlanError)` - The first violated constraint
pub fn plan_block<S: AsRef<str>>(
    base: Ipv4,
    azs: &[S],
    tiers: &TierLayout,
    toggles: &FeatureToggles,
) -> Result<TopologyPlan, PlanError> {
    if base.addr() != base.lo() {
        return Err(PlanError::InvalidAddressBlock {
            input: base.to_string(),
            source: CidrError::HostBitsSet {
                addr: base.addr(),
                mask: base.mask(),
                network: base.lo(),
            },
        });
    }
    let azs = check_availability_zones(azs)?;
    let private = check_tiers(tiers, toggles)?;
    check_private_size(base, private)?;

    let subnets = layout_subnets(base, &azs, tiers)?;
    validate_within(base, &subnets)?;
    validate_disjoint(&subnets)?;
    let routing = derive_routing(&subnets, toggles)?;

    log::info!(
        "Planned {} subnet(s) in {} across {} AZ(s), {} NAT gateway(s)",
        subnets.len(),
        base,
        azs.len(),
        routing.nat_gateways.len()
    );
    Ok(TopologyPlan::new(base, azs, subnets, routing))
}

fn check_availability_zones<S: AsRef<str>>(azs: &[S]) -> Result<Vec<String>, PlanError> {
    if azs.len() < MIN_AVAILABILITY_ZONES {
        return Err(PlanError::InsufficientAvailabilityZones {
            required: MIN_AVAILABILITY_ZONES,
            supplied: azs.len(),
        });
    }
    let mut seen = HashSet::new();
    for az in azs {
        if !seen.insert(az.as_ref()) {
            return Err(PlanError::DuplicateAvailabilityZone(az.as_ref().to_string()));
        }
    }
    Ok(azs.iter().map(|az| az.as_ref().to_string()).collect())
}

/// Check the tiers the layout and toggles require, returning the private
/// tier's spec.
fn check_tiers<'a>(
    tiers: &'a TierLayout,
    toggles: &FeatureToggles,
) -> Result<&'a TierSpec, PlanError> {
    let private = tiers
        .get(SubnetTier::Private)
        .ok_or_else(|| PlanError::MissingTier {
            tier: SubnetTier::Private,
            reason: "workload subnets are always planned".to_string(),
        })?;
    if toggles.enable_nat() && !tiers.contains(SubnetTier::Public) {
        return Err(PlanError::MissingTier {
            tier: SubnetTier::Public,
            reason: "NAT gateways are hosted in public subnets".to_string(),
        });
    }
    Ok(private)
}
