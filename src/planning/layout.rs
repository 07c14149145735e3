//! Carving tier subnets out of the base block.
//!
//! Every tier occupies a contiguous run of equally sized child blocks of the
//! base, starting at its offset. Runs are proven disjoint before any subnet
//! is handed out.

use crate::error::PlanError;
use crate::models::{CidrError, Ipv4, Subnet, SubnetTier, TierLayout, TierSpec};
use itertools::Itertools;

/// Largest private subnet the provider accepts (/17).
pub const PRIVATE_PREFIX_MIN: u8 = 17;
/// Smallest private subnet the provider accepts (/26, 64 addresses).
pub const PRIVATE_PREFIX_MAX: u8 = 26;

/// Contiguous run of child blocks one tier occupies in the base block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierSpan {
    pub tier: SubnetTier,
    base: Ipv4,
    newbits: u8,
    offset: u64,
    count: u64,
}

impl TierSpan {
    /// Validate that `count` blocks of `spec` fit in `base` and build the span.
    ///
    /// A tier without an explicit offset starts at child 0.
    pub fn new(base: Ipv4, tier: SubnetTier, spec: &TierSpec, count: usize) -> Result<TierSpan, PlanError> {
        TierSpan::after(base, tier, spec, count, &[])
    }

    /// Build the span of `tier`, placed after the spans already planned.
    ///
    /// # Arguments
    /// * `base` - The block the tier is carved from
    /// * `tier` - The tier being placed
    /// * `spec` - Its new bits and optional explicit offset
    /// * `count` - Number of subnets, one per AZ
    /// * `preceding` - Spans of the tiers planned before this one
    ///
    /// # Returns
    /// * `Ok(TierSpan)` - With an explicit offset the span starts at that child
    ///   index. Otherwise it starts at the first child index past the end of
    ///   every preceding span, so packed tiers never collide.
    /// * `Err(PlanError::AddressSpaceExhausted)` - The blocks do not fit in `base`
    pub fn after(
        base: Ipv4,
        tier: SubnetTier,
        spec: &TierSpec,
        count: usize,
        preceding: &[TierSpan],
    ) -> Result<TierSpan, PlanError> {
        let count = count as u64;
        let exhausted = |reason: String| PlanError::AddressSpaceExhausted { tier, base, reason };

        let available = base.child_count(spec.newbits).ok_or_else(|| {
            exhausted(format!(
                "/{} plus {} new bits is longer than /32",
                base.mask(),
                spec.newbits
            ))
        })?;
        let block_size = base.size() / available;
        let offset = match spec.offset {
            Some(offset) => offset,
            None => {
                let used = preceding
                    .iter()
                    .map(|span| span.hi() + 1 - u32::from(base.lo()) as u64)
                    .max()
                    .unwrap_or(0);
                used.div_ceil(block_size)
            }
        };
        let needed = offset
            .checked_add(count)
            .ok_or_else(|| exhausted(format!("offset {offset} is out of range")))?;
        if needed > available {
            return Err(exhausted(format!(
                "{count} blocks of /{} from offset {offset} need index {}, only {available} exist",
                base.mask() + spec.newbits,
                needed - 1,
            )));
        }

        Ok(TierSpan {
            tier,
            base,
            newbits: spec.newbits,
            offset,
            count,
        })
    }

    /// Child index of the base the first subnet of the tier sits at.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn prefix(&self) -> u8 {
        self.base.mask() + self.newbits
    }

    /// Subnet `index` of the tier, i.e. child `offset + index` of the base.
    pub fn block(&self, index: u64) -> Result<Ipv4, PlanError> {
        self.base
            .child(self.newbits, self.offset + index)
            .map_err(|e: CidrError| PlanError::AddressSpaceExhausted {
                tier: self.tier,
                base: self.base,
                reason: e.to_string(),
            })
    }

    fn block_size(&self) -> u64 {
        1u64 << (32 - self.prefix() as u32)
    }

    /// First address of the run.
    fn lo(&self) -> u64 {
        u32::from(self.base.lo()) as u64 + self.offset * self.block_size()
    }

    /// Last address of the run.
    fn hi(&self) -> u64 {
        self.lo() + self.count * self.block_size() - 1
    }

    /// Block of this run holding `addr`, which must lie inside the run.
    fn block_holding(&self, addr: u64) -> Result<Ipv4, PlanError> {
        self.block((addr - self.lo()) / self.block_size())
    }
}

/// Check the private tier's prefix length against the provider bounds.
pub fn check_private_size(base: Ipv4, spec: &TierSpec) -> Result<(), PlanError> {
    let prefix = base.mask() as u16 + spec.newbits as u16;
    let tier = SubnetTier::Private;
    if prefix > PRIVATE_PREFIX_MAX as u16 {
        return Err(PlanError::SubnetTooSmall {
            tier,
            prefix: prefix.min(u8::MAX as u16) as u8,
            limit: PRIVATE_PREFIX_MAX,
        });
    }
    if prefix < PRIVATE_PREFIX_MIN as u16 {
        return Err(PlanError::SubnetTooLarge {
            tier,
            prefix: prefix as u8,
            limit: PRIVATE_PREFIX_MIN,
        });
    }
    Ok(())
}

/// Prove that no two tier runs share an address.
///
/// On a collision the error names the first colliding block of each tier.
pub fn check_spans_disjoint(spans: &[TierSpan]) -> Result<(), PlanError> {
    for (a, b) in spans.iter().tuple_combinations() {
        if a.lo() <= b.hi() && b.lo() <= a.hi() {
            let first_shared = a.lo().max(b.lo());
            return Err(PlanError::SubnetOverlap {
                first_tier: a.tier,
                first: a.block_holding(first_shared)?,
                second_tier: b.tier,
                second: b.block_holding(first_shared)?,
            });
        }
    }
    Ok(())
}

/// Compute the subnets of every tier, positionally bound to `azs`.
///
/// Tiers are placed in priority order. A tier with no explicit offset is
/// packed after the tiers before it; explicit offsets are taken as given and
/// then proven disjoint from every other tier.
///
/// # Arguments
/// * `base` - The root allocation
/// * `azs` - Availability zones, subnet `i` of every tier lands in `azs[i]`
/// * `tiers` - Per-tier new bits and offsets
///
/// # Returns
/// * `Ok(Vec<Subnet>)` - Tier by tier in priority order, then by AZ index
/// * `Err(PlanError)` - `AddressSpaceExhausted` or `SubnetOverlap`
pub fn layout_subnets(base: Ipv4, azs: &[String], tiers: &TierLayout) -> Result<Vec<Subnet>, PlanError> {
    let mut spans: Vec<TierSpan> = Vec::with_capacity(tiers.len());
    for (tier, spec) in tiers.iter() {
        let span = TierSpan::after(base, tier, spec, azs.len(), &spans)?;
        log::debug!("{tier} tier starts at child {} of {base}", span.offset());
        spans.push(span);
    }
    check_spans_disjoint(&spans)?;

    let mut subnets = Vec::with_capacity(spans.len() * azs.len());
    for span in &spans {
        for (index, az) in azs.iter().enumerate() {
            let cidr = span.block(index as u64)?;
            log::debug!("{} subnet {index}: {cidr} in {az}", span.tier);
            subnets.push(Subnet {
                tier: span.tier,
                az: az.clone(),
                cidr,
                index,
            });
        }
    }
    Ok(subnets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn azs(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn cidr(s: &str) -> Ipv4 {
        Ipv4::new(s).unwrap()
    }

    #[test]
    fn test_private_size_bounds() {
        let base = cidr("10.0.0.0/16");
        assert!(check_private_size(base, &TierSpec::new(1)).is_ok());
        assert!(check_private_size(base, &TierSpec::new(10)).is_ok());
        assert_eq!(
            check_private_size(base, &TierSpec::new(11)),
            Err(PlanError::SubnetTooSmall {
                tier: SubnetTier::Private,
                prefix: 27,
                limit: 26
            })
        );
        assert_eq!(
            check_private_size(base, &TierSpec::new(0)),
            Err(PlanError::SubnetTooLarge {
                tier: SubnetTier::Private,
                prefix: 16,
                limit: 17
            })
        );
    }

    #[test]
    fn test_span_exhausted() {
        let base = cidr("10.0.0.0/24");
        let err = TierSpan::new(base, SubnetTier::Public, &TierSpec::with_offset(2, 3), 2).unwrap_err();
        assert!(matches!(
            err,
            PlanError::AddressSpaceExhausted {
                tier: SubnetTier::Public,
                ..
            }
        ));
        let err = TierSpan::new(base, SubnetTier::Endpoint, &TierSpec::new(9), 2).unwrap_err();
        assert!(err.to_string().contains("longer than /32"), "{err}");
        assert!(TierSpan::new(base, SubnetTier::Public, &TierSpec::new(4), 3).is_ok());
    }

    #[test]
    fn test_overlap_names_colliding_blocks() {
        let base = cidr("10.0.0.0/24");
        let private = TierSpan::new(base, SubnetTier::Private, &TierSpec::new(2), 2).unwrap();
        let public = TierSpan::new(base, SubnetTier::Public, &TierSpec::with_offset(4, 4), 2).unwrap();
        assert_eq!(
            check_spans_disjoint(&[private, public]),
            Err(PlanError::SubnetOverlap {
                first_tier: SubnetTier::Private,
                first: cidr("10.0.0.64/26"),
                second_tier: SubnetTier::Public,
                second: cidr("10.0.0.64/28"),
            })
        );

        let public = TierSpan::new(base, SubnetTier::Public, &TierSpec::with_offset(4, 8), 2).unwrap();
        assert!(check_spans_disjoint(&[private, public]).is_ok());
    }

    #[test]
    fn test_adjacent_spans_are_disjoint() {
        let base = cidr("10.0.0.0/16");
        let private = TierSpan::new(base, SubnetTier::Private, &TierSpec::new(2), 3).unwrap();
        // private ends at 10.0.191.255, public starts at 10.0.192.0
        let public = TierSpan::new(base, SubnetTier::Public, &TierSpec::with_offset(4, 12), 3).unwrap();
        assert!(check_spans_disjoint(&[private, public]).is_ok());
        assert_eq!(public.block(0).unwrap(), cidr("10.0.192.0/20"));
    }

    #[test]
    fn test_packed_tiers_follow_preceding_spans() {
        let base = cidr("10.0.0.0/24");
        let private = TierSpan::new(base, SubnetTier::Private, &TierSpec::new(2), 2).unwrap();
        assert_eq!(private.offset(), 0);
        // private ends at 10.0.0.127, the first /28 after it is child 8
        let public = TierSpan::after(base, SubnetTier::Public, &TierSpec::new(4), 2, &[private]).unwrap();
        assert_eq!(public.offset(), 8);
        // public ends at 10.0.0.159, rounded up to the next /27 boundary
        let endpoint =
            TierSpan::after(base, SubnetTier::Endpoint, &TierSpec::new(3), 2, &[private, public]).unwrap();
        assert_eq!(endpoint.offset(), 5);
        assert_eq!(endpoint.block(0).unwrap(), cidr("10.0.0.160/27"));
        assert!(check_spans_disjoint(&[private, public, endpoint]).is_ok());

        let err = TierSpan::after(base, SubnetTier::Endpoint, &TierSpec::new(2), 2, &[private, public]).unwrap_err();
        assert!(matches!(err, PlanError::AddressSpaceExhausted { .. }), "{err}");
    }

    #[test]
    fn test_layout_default_offsets() {
        let base = cidr("10.0.0.0/24");
        let layout = TierLayout::new()
            .with(SubnetTier::Private, 2)
            .with(SubnetTier::Public, 4);
        let zones = azs(&["us-east-1a", "us-east-1b"]);
        let subnets = layout_subnets(base, &zones, &layout).unwrap();
        let got: Vec<String> = subnets.iter().map(|s| s.cidr.to_string()).collect();
        assert_eq!(
            got,
            vec!["10.0.0.0/26", "10.0.0.64/26", "10.0.0.128/28", "10.0.0.144/28"]
        );
    }

    #[test]
    fn test_explicit_offset_collision_fails_closed() {
        let base = cidr("10.0.0.0/24");
        let layout = TierLayout::new()
            .with(SubnetTier::Private, 2)
            .with_offset(SubnetTier::Public, 4, 4);
        let zones = azs(&["us-east-1a", "us-east-1b"]);
        assert!(matches!(
            layout_subnets(base, &zones, &layout),
            Err(PlanError::SubnetOverlap { .. })
        ));
    }

    #[test]
    fn test_layout_subnets_positional() {
        let base = cidr("10.0.0.0/24");
        let layout = TierLayout::new()
            .with(SubnetTier::Private, 2)
            .with_offset(SubnetTier::Public, 4, 12);
        let zones = azs(&["us-east-1a", "us-east-1b"]);
        let subnets = layout_subnets(base, &zones, &layout).unwrap();

        let got: Vec<(SubnetTier, &str, String)> = subnets
            .iter()
            .map(|s| (s.tier, s.az.as_str(), s.cidr.to_string()))
            .collect();
        assert_eq!(
            got,
            vec![
                (SubnetTier::Private, "us-east-1a", "10.0.0.0/26".to_string()),
                (SubnetTier::Private, "us-east-1b", "10.0.0.64/26".to_string()),
                (SubnetTier::Public, "us-east-1a", "10.0.0.192/28".to_string()),
                (SubnetTier::Public, "us-east-1b", "10.0.0.208/28".to_string()),
            ]
        );
    }
}
