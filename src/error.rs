//! Error types for planning and configuration loading.

use crate::models::{CidrError, Ipv4, SubnetTier};
use thiserror::Error;

/// Reasons a topology cannot be planned. Every variant is terminal for the
/// planning call that raised it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("invalid address block '{input}': {source}")]
    InvalidAddressBlock { input: String, source: CidrError },

    #[error("at least {required} availability zones are required, got {supplied}")]
    InsufficientAvailabilityZones { required: usize, supplied: usize },

    #[error("availability zone '{0}' is listed more than once")]
    DuplicateAvailabilityZone(String),

    #[error("{tier} tier is required: {reason}")]
    MissingTier { tier: SubnetTier, reason: String },

    #[error("{tier} subnets of /{prefix} are smaller than the /{limit} minimum")]
    SubnetTooSmall {
        tier: SubnetTier,
        prefix: u8,
        limit: u8,
    },

    #[error("{tier} subnets of /{prefix} are larger than the /{limit} maximum")]
    SubnetTooLarge {
        tier: SubnetTier,
        prefix: u8,
        limit: u8,
    },

    #[error("{tier} tier does not fit in {base}: {reason}")]
    AddressSpaceExhausted {
        tier: SubnetTier,
        base: Ipv4,
        reason: String,
    },

    #[error("{first_tier} subnet {first} overlaps {second_tier} subnet {second}")]
    SubnetOverlap {
        first_tier: SubnetTier,
        first: Ipv4,
        second_tier: SubnetTier,
        second: Ipv4,
    },

    #[error("security invariant violated: {0}")]
    SecurityInvariantViolation(String),

    #[error("private subnets require egress but neither NAT nor PrivateLink backend is enabled")]
    PrivateEgressUnavailable,
}

/// Errors raised while loading a plan request.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read request file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid request file {path} at '{location}': {message}")]
    Parse {
        path: String,
        location: String,
        message: String,
    },

    #[error("invalid value for {var}: {message}")]
    Env { var: String, message: String },

    #[error(transparent)]
    Plan(#[from] PlanError),
}
