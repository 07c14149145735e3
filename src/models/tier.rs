//! Subnet tiers and their sizing parameters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Named role of a subnet.
///
/// The declaration order is the planning priority order: private blocks are
/// enumerated before public, public before endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SubnetTier {
    /// Workload subnets. Never routed directly to the internet.
    Private,
    /// NAT-only subnets facing the internet gateway.
    Public,
    /// Interface endpoint subnets (PrivateLink).
    Endpoint,
}

impl SubnetTier {
    pub const ALL: [SubnetTier; 3] = [SubnetTier::Private, SubnetTier::Public, SubnetTier::Endpoint];

    pub fn as_str(self) -> &'static str {
        match self {
            SubnetTier::Private => "private",
            SubnetTier::Public => "public",
            SubnetTier::Endpoint => "endpoint",
        }
    }
}

impl fmt::Display for SubnetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sizing of one tier relative to the base block.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TierSpec {
    /// Bits added to the base prefix for every subnet of the tier.
    pub newbits: u8,
    /// First child index the tier enumerates from. When unset the tier is
    /// packed directly after the tiers planned before it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

impl TierSpec {
    pub fn new(newbits: u8) -> TierSpec {
        TierSpec {
            newbits,
            offset: None,
        }
    }

    pub fn with_offset(newbits: u8, offset: u64) -> TierSpec {
        TierSpec {
            newbits,
            offset: Some(offset),
        }
    }
}

/// Tier → sizing mapping, iterated in tier priority order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct TierLayout {
    tiers: BTreeMap<SubnetTier, TierSpec>,
}

impl TierLayout {
    pub fn new() -> TierLayout {
        TierLayout::default()
    }

    /// Add or replace a tier packed after the tiers before it.
    pub fn with(mut self, tier: SubnetTier, newbits: u8) -> TierLayout {
        self.tiers.insert(tier, TierSpec::new(newbits));
        self
    }

    /// Add or replace a tier with an explicit starting index.
    pub fn with_offset(mut self, tier: SubnetTier, newbits: u8, offset: u64) -> TierLayout {
        self.tiers.insert(tier, TierSpec::with_offset(newbits, offset));
        self
    }

    pub fn get(&self, tier: SubnetTier) -> Option<&TierSpec> {
        self.tiers.get(&tier)
    }

    pub fn contains(&self, tier: SubnetTier) -> bool {
        self.tiers.contains_key(&tier)
    }

    /// Tiers in priority order.
    pub fn iter(&self) -> impl Iterator<Item = (SubnetTier, &TierSpec)> {
        self.tiers.iter().map(|(tier, spec)| (*tier, spec))
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}
