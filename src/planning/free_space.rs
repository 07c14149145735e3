//! Unallocated space left in the base block after planning.
//!
//! Gaps between planned subnets are split into the largest aligned CIDR
//! blocks that fit, which is the headroom available for future tiers.

use crate::models::{lo_mask, CidrError, Ipv4, TopologyPlan, MAX_LENGTH};
use std::net::Ipv4Addr;

/// Free blocks of a plan's base, in address order.
pub fn free_blocks(plan: &TopologyPlan) -> Result<Vec<Ipv4>, CidrError> {
    free_blocks_in(plan.base(), plan.subnets().iter().map(|s| s.cidr))
}

/// Free blocks of `base` not covered by any of `allocated`.
///
/// Allocated blocks outside `base` are ignored.
pub fn free_blocks_in(
    base: Ipv4,
    allocated: impl IntoIterator<Item = Ipv4>,
) -> Result<Vec<Ipv4>, CidrError> {
    let mut used: Vec<Ipv4> = allocated.into_iter().filter(|c| base.covers(c)).collect();
    used.sort();

    let end = u32::from(base.hi()) as u64 + 1;
    let mut next = u32::from(base.lo()) as u64;
    let mut free = Vec::new();

    for block in used {
        let lo = u32::from(block.lo()) as u64;
        if lo > next {
            split_gap(next, lo, &mut free)?;
        }
        next = next.max(u32::from(block.hi()) as u64 + 1);
    }
    if next < end {
        split_gap(next, end, &mut free)?;
    }
    Ok(free)
}

/// Addresses of a plan's base not used by any subnet.
pub fn free_addresses(plan: &TopologyPlan) -> u64 {
    plan.base().size() - plan.allocated_addresses()
}

/// Cover `[start, end)` with the largest aligned blocks.
fn split_gap(mut start: u64, end: u64, out: &mut Vec<Ipv4>) -> Result<(), CidrError> {
    while start < end {
        let mask = biggest_block(start, end);
        let addr = u32::try_from(start).map_err(|_| CidrError::Overflow)?;
        out.push(Ipv4::from_parts(Ipv4Addr::from(addr), mask)?);
        start += 1u64 << (MAX_LENGTH - mask);
    }
    Ok(())
}

/// Shortest prefix for a block at `start` that is aligned and ends by `end`.
fn biggest_block(start: u64, end: u64) -> u8 {
    let mut mask = lo_mask(Ipv4Addr::from(start as u32));
    while mask < MAX_LENGTH && start + (1u64 << (MAX_LENGTH - mask)) > end {
        mask += 1;
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cidr(s: &str) -> Ipv4 {
        Ipv4::new(s).unwrap()
    }

    fn strings(blocks: Vec<Ipv4>) -> Vec<String> {
        blocks.into_iter().map(|b| b.to_string()).collect()
    }

    #[test]
    fn test_free_blocks_between_tiers() {
        let base = cidr("10.0.0.0/24");
        let used = vec![
            cidr("10.0.0.208/28"),
            cidr("10.0.0.0/26"),
            cidr("10.0.0.64/26"),
            cidr("10.0.0.192/28"),
        ];
        assert_eq!(
            strings(free_blocks_in(base, used).unwrap()),
            vec!["10.0.0.128/26", "10.0.0.224/27"]
        );
    }

    #[test]
    fn test_empty_base_is_free() {
        let base = cidr("10.0.0.0/16");
        assert_eq!(strings(free_blocks_in(base, vec![]).unwrap()), vec!["10.0.0.0/16"]);
    }

    #[test]
    fn test_unaligned_gap() {
        // gap 10.0.0.16 - 10.0.0.191 splits into aligned pieces
        let base = cidr("10.0.0.0/24");
        let used = vec![cidr("10.0.0.0/28"), cidr("10.0.0.192/26")];
        assert_eq!(
            strings(free_blocks_in(base, used).unwrap()),
            vec!["10.0.0.16/28", "10.0.0.32/27", "10.0.0.64/26", "10.0.0.128/26"]
        );
    }

    #[test]
    fn test_fully_allocated() {
        let base = cidr("10.0.0.0/24");
        let used = vec![cidr("10.0.0.0/25"), cidr("10.0.0.128/25"), cidr("192.168.0.0/24")];
        assert!(free_blocks_in(base, used).unwrap().is_empty());
    }

    #[test]
    fn test_whole_address_space() {
        let base = cidr("0.0.0.0/0");
        let used = vec![cidr("0.0.0.0/1")];
        assert_eq!(strings(free_blocks_in(base, used).unwrap()), vec!["128.0.0.0/1"]);
    }
}
