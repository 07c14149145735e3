//! Deployment feature toggles.
//!
//! [`ToggleConfig`] is the raw, deserializable flag set. [`FeatureToggles`]
//! can only be obtained from it through `TryFrom`, which refuses the
//! combinations a topology must never be planned with.

use crate::error::PlanError;
use serde::{Deserialize, Serialize};

/// How NAT gateways are laid out across availability zones.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NatMode {
    /// One NAT gateway in every AZ's public subnet.
    #[default]
    PerAz,
    /// One NAT gateway, in the first AZ's public subnet, shared by all AZs.
    Single,
}

/// Raw feature flags as they appear in a plan request.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ToggleConfig {
    pub enable_nat: bool,
    pub nat_mode: NatMode,
    pub enable_internet_gateway: bool,
    pub enable_privatelink_backend: bool,
    pub enable_privatelink_frontend: bool,
    /// Workloads need outbound connectivity (package mirrors, control plane).
    pub require_private_egress: bool,
    /// Route private subnets straight to the internet gateway. Always refused.
    pub direct_private_internet_route: bool,
}

/// Validated toggle set the planner consumes.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureToggles {
    enable_nat: bool,
    nat_mode: NatMode,
    enable_internet_gateway: bool,
    enable_privatelink_backend: bool,
    enable_privatelink_frontend: bool,
    require_private_egress: bool,
}

impl FeatureToggles {
    /// Fully private deployment: PrivateLink for both front and back end,
    /// no NAT, no internet gateway.
    pub fn enterprise() -> FeatureToggles {
        FeatureToggles {
            enable_nat: false,
            nat_mode: NatMode::PerAz,
            enable_internet_gateway: false,
            enable_privatelink_backend: true,
            enable_privatelink_frontend: true,
            require_private_egress: false,
        }
    }

    /// NAT based egress with one NAT per AZ behind an internet gateway.
    pub fn premium_simulation() -> FeatureToggles {
        FeatureToggles {
            enable_nat: true,
            nat_mode: NatMode::PerAz,
            enable_internet_gateway: true,
            enable_privatelink_backend: false,
            enable_privatelink_frontend: false,
            require_private_egress: true,
        }
    }

    pub fn enable_nat(&self) -> bool {
        self.enable_nat
    }

    pub fn nat_mode(&self) -> NatMode {
        self.nat_mode
    }

    pub fn enable_internet_gateway(&self) -> bool {
        self.enable_internet_gateway
    }

    pub fn enable_privatelink_backend(&self) -> bool {
        self.enable_privatelink_backend
    }

    pub fn enable_privatelink_frontend(&self) -> bool {
        self.enable_privatelink_frontend
    }

    pub fn require_private_egress(&self) -> bool {
        self.require_private_egress
    }
}

impl TryFrom<ToggleConfig> for FeatureToggles {
    type Error = PlanError;

    fn try_from(raw: ToggleConfig) -> Result<Self, Self::Error> {
        if raw.direct_private_internet_route {
            return Err(PlanError::SecurityInvariantViolation(
                "private subnets must never route directly to an internet gateway".to_string(),
            ));
        }
        if !raw.enable_nat && !raw.enable_privatelink_backend && raw.require_private_egress {
            return Err(PlanError::PrivateEgressUnavailable);
        }
        if raw.enable_nat && !raw.enable_internet_gateway {
            log::warn!("NAT enabled without an internet gateway, NAT traffic has no upstream");
        }
        if raw.nat_mode == NatMode::Single && !raw.enable_nat {
            log::debug!("nat_mode=single ignored, NAT is disabled");
        }
        Ok(FeatureToggles {
            enable_nat: raw.enable_nat,
            nat_mode: raw.nat_mode,
            enable_internet_gateway: raw.enable_internet_gateway,
            enable_privatelink_backend: raw.enable_privatelink_backend,
            enable_privatelink_frontend: raw.enable_privatelink_frontend,
            require_private_egress: raw.require_private_egress,
        })
    }
}

impl From<FeatureToggles> for ToggleConfig {
    fn from(toggles: FeatureToggles) -> Self {
        ToggleConfig {
            enable_nat: toggles.enable_nat,
            nat_mode: toggles.nat_mode,
            enable_internet_gateway: toggles.enable_internet_gateway,
            enable_privatelink_backend: toggles.enable_privatelink_backend,
            enable_privatelink_frontend: toggles.enable_privatelink_frontend,
            require_private_egress: toggles.require_private_egress,
            direct_private_internet_route: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_internet_route_refused() {
        let raw = ToggleConfig {
            enable_internet_gateway: true,
            direct_private_internet_route: true,
            ..Default::default()
        };
        assert!(matches!(
            FeatureToggles::try_from(raw),
            Err(PlanError::SecurityInvariantViolation(_))
        ));
    }

    #[test]
    fn test_egress_needs_nat_or_privatelink() {
        let raw = ToggleConfig {
            require_private_egress: true,
            ..Default::default()
        };
        assert_eq!(
            FeatureToggles::try_from(raw),
            Err(PlanError::PrivateEgressUnavailable)
        );

        let with_privatelink = ToggleConfig {
            enable_privatelink_backend: true,
            ..raw
        };
        assert!(FeatureToggles::try_from(with_privatelink).is_ok());

        let with_nat = ToggleConfig {
            enable_nat: true,
            enable_internet_gateway: true,
            ..raw
        };
        assert!(FeatureToggles::try_from(with_nat).is_ok());
    }

    #[test]
    fn test_presets_are_valid() {
        for preset in [FeatureToggles::enterprise(), FeatureToggles::premium_simulation()] {
            let raw = ToggleConfig::from(preset);
            assert_eq!(FeatureToggles::try_from(raw), Ok(preset));
        }
        assert!(!FeatureToggles::enterprise().enable_nat());
        assert!(FeatureToggles::premium_simulation().enable_nat());
    }

    #[test]
    fn test_unknown_toggle_rejected() {
        let parsed = serde_json::from_str::<ToggleConfig>(r#"{"enable_system_tables": true}"#);
        assert!(parsed.is_err());

        let parsed: ToggleConfig =
            serde_json::from_str(r#"{"enable_nat": true, "nat_mode": "single"}"#).unwrap();
        assert!(parsed.enable_nat);
        assert_eq!(parsed.nat_mode, NatMode::Single);
        assert!(!parsed.enable_internet_gateway);
    }
}
