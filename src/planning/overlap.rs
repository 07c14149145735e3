//! Overlap detection across a planned subnet set.
//!
//! The layout step already proves tier runs disjoint; this is the final
//! check over every pair of subnets before a plan is returned.

use crate::error::PlanError;
use crate::models::{Ipv4, Subnet};
use itertools::Itertools;

/// Two planned subnets sharing addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapConflict {
    pub first: Subnet,
    pub second: Subnet,
}

impl From<OverlapConflict> for PlanError {
    fn from(conflict: OverlapConflict) -> Self {
        PlanError::SubnetOverlap {
            first_tier: conflict.first.tier,
            first: conflict.first.cidr,
            second_tier: conflict.second.tier,
            second: conflict.second.cidr,
        }
    }
}

/// Find every pair of overlapping subnets.
///
/// Conflicts are sorted by the first subnet's block for consistent output.
pub fn find_overlapping_subnets(subnets: &[Subnet]) -> Vec<OverlapConflict> {
    let mut conflicts: Vec<OverlapConflict> = subnets
        .iter()
        .tuple_combinations()
        .filter(|(a, b)| a.cidr.overlaps(&b.cidr))
        .map(|(a, b)| {
            let (first, second) = if a.cidr <= b.cidr { (a, b) } else { (b, a) };
            OverlapConflict {
                first: first.clone(),
                second: second.clone(),
            }
        })
        .collect();

    conflicts.sort_by_key(|c| (c.first.cidr, c.second.cidr));
    conflicts
}

/// Log overlapping subnets as warnings.
pub fn log_overlapping_subnets(conflicts: &[OverlapConflict]) {
    if conflicts.is_empty() {
        log::debug!("No overlapping subnets found.");
        return;
    }

    log::warn!("Found {} overlapping subnet pair(s):", conflicts.len());
    for conflict in conflicts {
        log::warn!("  - {} overlaps {}", conflict.first, conflict.second);
    }
}

/// Fail with [`PlanError::SubnetOverlap`] on the first overlapping pair.
pub fn validate_disjoint(subnets: &[Subnet]) -> Result<(), PlanError> {
    let conflicts = find_overlapping_subnets(subnets);
    log_overlapping_subnets(&conflicts);
    match conflicts.into_iter().next() {
        Some(conflict) => Err(conflict.into()),
        None => Ok(()),
    }
}

/// Check that every subnet lies inside `base`.
pub fn validate_within(base: Ipv4, subnets: &[Subnet]) -> Result<(), PlanError> {
    match subnets.iter().find(|s| !base.covers(&s.cidr)) {
        Some(outside) => Err(PlanError::AddressSpaceExhausted {
            tier: outside.tier,
            base,
            reason: format!("{} falls outside the base block", outside.cidr),
        }),
        None => Ok(()),
    }
}
