//! Plan request loading.
//!
//! A request is a JSON file naming the base block, the AZs, the tier layout
//! and the toggles. A few environment variables (usually set through `.env`)
//! can override it:
//! - `PLANNER_BASE_CIDR` - base block
//! - `PLANNER_AZS` - comma separated AZ list
//! - `PLANNER_PROFILE` - `enterprise` or `premium`, replaces the toggles

use crate::error::ConfigError;
use crate::models::{FeatureToggles, TierLayout, ToggleConfig, TopologyPlan};
use crate::planning;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub const ENV_BASE_CIDR: &str = "PLANNER_BASE_CIDR";
pub const ENV_AZS: &str = "PLANNER_AZS";
pub const ENV_PROFILE: &str = "PLANNER_PROFILE";

/// Named toggle presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Enterprise,
    Premium,
}

impl Profile {
    pub fn toggles(self) -> FeatureToggles {
        match self {
            Profile::Enterprise => FeatureToggles::enterprise(),
            Profile::Premium => FeatureToggles::premium_simulation(),
        }
    }
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enterprise" => Ok(Profile::Enterprise),
            "premium" | "premium-simulation" | "premium_simulation" => Ok(Profile::Premium),
            other => Err(format!("unknown profile '{other}', expected enterprise or premium")),
        }
    }
}

/// Everything one planning call needs.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PlanRequest {
    pub base_cidr: String,
    pub availability_zones: Vec<String>,
    pub tiers: TierLayout,
    #[serde(default)]
    pub toggles: ToggleConfig,
}

impl PlanRequest {
    /// Read a request from a JSON file.
    pub fn read(path: &Path) -> Result<PlanRequest, ConfigError> {
        let name = path.display().to_string();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: name.clone(),
            source,
        })?;
        log::info!("Reading plan request: {name}");
        PlanRequest::from_json(&name, &json)
    }

    /// Parse a request, reporting the JSON path of the offending field.
    pub fn from_json(name: &str, json: &str) -> Result<PlanRequest, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|e| ConfigError::Parse {
            path: name.to_string(),
            location: e.path().to_string(),
            message: e.inner().to_string(),
        })
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(self) -> Result<PlanRequest, ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn apply_overrides<F>(mut self, lookup: F) -> Result<PlanRequest, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup(ENV_BASE_CIDR) {
            log::info!("{ENV_BASE_CIDR} overrides base block: {base}");
            self.base_cidr = base.trim().to_string();
        }
        if let Some(azs) = lookup(ENV_AZS) {
            let azs: Vec<String> = azs
                .split(',')
                .map(str::trim)
                .filter(|az| !az.is_empty())
                .map(String::from)
                .collect();
            if azs.is_empty() {
                return Err(ConfigError::Env {
                    var: ENV_AZS.to_string(),
                    message: "no availability zones listed".to_string(),
                });
            }
            log::info!("{ENV_AZS} overrides availability zones: {}", azs.join(","));
            self.availability_zones = azs;
        }
        if let Some(profile) = lookup(ENV_PROFILE) {
            let profile: Profile = profile.parse().map_err(|message| ConfigError::Env {
                var: ENV_PROFILE.to_string(),
                message,
            })?;
            log::info!("{ENV_PROFILE} selects {profile:?} toggles");
            self.toggles = ToggleConfig::from(profile.toggles());
        }
        Ok(self)
    }

    /// Validate the raw toggles.
    pub fn toggles(&self) -> Result<FeatureToggles, ConfigError> {
        Ok(FeatureToggles::try_from(self.toggles)?)
    }

    /// Plan the requested topology.
    pub fn plan(&self) -> Result<TopologyPlan, ConfigError> {
        let toggles = self.toggles()?;
        Ok(planning::plan(
            &self.base_cidr,
            &self.availability_zones,
            &self.tiers,
            &toggles,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlanError;
    use crate::models::SubnetTier;
    use std::collections::HashMap;
    use std::io::Write;

    const REQUEST: &str = r#"{
        "base_cidr": "10.0.0.0/24",
        "availability_zones": ["us-east-1a", "us-east-1b"],
        "tiers": {
            "private": { "newbits": 2 },
            "public": { "newbits": 4, "offset": 12 }
        },
        "toggles": { "enable_nat": true, "enable_internet_gateway": true }
    }"#;

    #[test]
    fn test_read_request_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(REQUEST.as_bytes()).unwrap();
        let request = PlanRequest::read(file.path()).expect("Error reading request");
        assert_eq!(request.base_cidr, "10.0.0.0/24");
        assert_eq!(request.availability_zones.len(), 2);
        assert!(request.tiers.contains(SubnetTier::Public));
        assert!(request.toggles.enable_nat);

        let plan = request.plan().unwrap();
        assert_eq!(plan.subnets().len(), 4);
        assert_eq!(plan.nat_gateways().len(), 2);
    }

    #[test]
    fn test_missing_file() {
        let err = PlanRequest::read(Path::new("does/not/exist.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_parse_error_reports_path() {
        let json = r#"{
            "base_cidr": "10.0.0.0/24",
            "availability_zones": ["a", "b"],
            "tiers": { "private": { "newbits": "two" } }
        }"#;
        match PlanRequest::from_json("inline", json).unwrap_err() {
            ConfigError::Parse { location, .. } => {
                assert!(location.ends_with("newbits"), "{location}")
            }
            other => panic!("unexpected error {other}"),
        }

        let unknown_toggle = r#"{
            "base_cidr": "10.0.0.0/24",
            "availability_zones": ["a", "b"],
            "tiers": { "private": { "newbits": 2 } },
            "toggles": { "enable_system_tables": true }
        }"#;
        assert!(PlanRequest::from_json("inline", unknown_toggle).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_BASE_CIDR, "10.1.0.0/16"),
            (ENV_AZS, "eu-west-1a, eu-west-1b ,eu-west-1c"),
            (ENV_PROFILE, "enterprise"),
        ]
        .into_iter()
        .collect();
        let request = PlanRequest::from_json("inline", REQUEST)
            .unwrap()
            .apply_overrides(|var| env.get(var).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(request.base_cidr, "10.1.0.0/16");
        assert_eq!(
            request.availability_zones,
            vec!["eu-west-1a", "eu-west-1b", "eu-west-1c"]
        );
        assert_eq!(request.toggles().unwrap(), FeatureToggles::enterprise());
    }

    #[test]
    fn test_bad_env_values() {
        let request = PlanRequest::from_json("inline", REQUEST).unwrap();
        let err = request
            .clone()
            .apply_overrides(|var| (var == ENV_PROFILE).then(|| "standard".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { .. }));

        let err = request
            .apply_overrides(|var| (var == ENV_AZS).then(|| " , ".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_AZS));
    }

    #[test]
    fn test_invalid_toggles_surface_as_plan_error() {
        let mut request = PlanRequest::from_json("inline", REQUEST).unwrap();
        request.toggles.direct_private_internet_route = true;
        assert!(matches!(
            request.plan(),
            Err(ConfigError::Plan(PlanError::SecurityInvariantViolation(_)))
        ));
    }
}
