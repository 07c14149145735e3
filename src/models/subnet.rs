//! Planned subnet.

use super::{Ipv4, SubnetTier};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One subnet of a [`TopologyPlan`](super::TopologyPlan).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subnet {
    /// Role of the subnet.
    pub tier: SubnetTier,
    /// Availability zone the subnet is placed in.
    pub az: String,
    /// Address block of the subnet.
    pub cidr: Ipv4,
    /// Position within the tier, which is also the AZ position.
    pub index: usize,
}

impl Subnet {
    /// Hosts usable after the provider's reserved addresses.
    pub fn usable_hosts(&self) -> u64 {
        self.cidr.usable_hosts().unwrap_or(0)
    }

    /// Resource style name, e.g. `private-us-east-1a`.
    pub fn name(&self) -> String {
        format!("{}-{}", self.tier, self.az)
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.tier, self.cidr, self.az)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnet_name_and_hosts() {
        let subnet = Subnet {
            tier: SubnetTier::Private,
            az: "us-east-1a".to_string(),
            cidr: Ipv4::new("10.0.0.0/26").unwrap(),
            index: 0,
        };
        assert_eq!(subnet.name(), "private-us-east-1a");
        assert_eq!(subnet.usable_hosts(), 59);
        assert_eq!(subnet.to_string(), "private 10.0.0.0/26 (us-east-1a)");

        let tiny = Subnet {
            cidr: Ipv4::new("10.0.0.0/31").unwrap(),
            ..subnet
        };
        assert_eq!(tiny.usable_hosts(), 0);
    }
}
