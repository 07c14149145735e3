//! Planned topology and its routing facts.

use super::{Ipv4, Subnet, SubnetTier};
use serde::Serialize;

/// Where a subnet's default route points.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RouteTarget {
    /// NAT gateway hosted in the public subnet `subnet` of zone `az`.
    NatGateway { az: String, subnet: Ipv4 },
    InternetGateway,
}

/// Default route of one subnet.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct RouteFact {
    pub tier: SubnetTier,
    pub az: String,
    pub subnet: Ipv4,
    pub destination: Ipv4,
    pub target: RouteTarget,
}

impl RouteFact {
    pub fn default_route(subnet: &Subnet, target: RouteTarget) -> RouteFact {
        RouteFact {
            tier: subnet.tier,
            az: subnet.az.clone(),
            subnet: subnet.cidr,
            destination: Ipv4::DEFAULT_ROUTE,
            target,
        }
    }
}

/// A NAT gateway and the public subnet hosting it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NatGateway {
    pub az: String,
    pub subnet: Ipv4,
}

/// How workloads in the private tier reach the provider's control plane.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ControlPlanePath {
    /// Through the NAT gateways and the public internet.
    Nat,
    /// Through the backend PrivateLink endpoint. NAT, if present, only
    /// serves package and API egress.
    PrivateLink,
    /// No route to the control plane is planned.
    Unrouted,
}

/// Result of one planning call.
///
/// Built only by the planner, fully validated, and never edited afterwards:
/// a different topology means planning again.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TopologyPlan {
    base: Ipv4,
    availability_zones: Vec<String>,
    subnets: Vec<Subnet>,
    nat_gateways: Vec<NatGateway>,
    internet_gateway: bool,
    routes: Vec<RouteFact>,
    control_plane: ControlPlanePath,
    privatelink_frontend: bool,
}

/// Routing part of a plan, as derived from the toggles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routing {
    pub nat_gateways: Vec<NatGateway>,
    pub internet_gateway: bool,
    pub routes: Vec<RouteFact>,
    pub control_plane: ControlPlanePath,
    pub privatelink_frontend: bool,
}

impl TopologyPlan {
    pub(crate) fn new(
        base: Ipv4,
        availability_zones: Vec<String>,
        subnets: Vec<Subnet>,
        routing: Routing,
    ) -> TopologyPlan {
        TopologyPlan {
            base,
            availability_zones,
            subnets,
            nat_gateways: routing.nat_gateways,
            internet_gateway: routing.internet_gateway,
            routes: routing.routes,
            control_plane: routing.control_plane,
            privatelink_frontend: routing.privatelink_frontend,
        }
    }

    pub fn base(&self) -> Ipv4 {
        self.base
    }

    pub fn availability_zones(&self) -> &[String] {
        &self.availability_zones
    }

    /// All subnets, tier by tier in priority order, then by index.
    pub fn subnets(&self) -> &[Subnet] {
        &self.subnets
    }

    pub fn subnets_in(&self, tier: SubnetTier) -> impl Iterator<Item = &Subnet> {
        self.subnets.iter().filter(move |s| s.tier == tier)
    }

    pub fn subnet(&self, tier: SubnetTier, index: usize) -> Option<&Subnet> {
        self.subnets_in(tier).find(|s| s.index == index)
    }

    pub fn nat_gateways(&self) -> &[NatGateway] {
        &self.nat_gateways
    }

    pub fn has_internet_gateway(&self) -> bool {
        self.internet_gateway
    }

    pub fn routes(&self) -> &[RouteFact] {
        &self.routes
    }

    /// Default route of the subnet with the given block, if it has one.
    pub fn route_for(&self, cidr: Ipv4) -> Option<&RouteFact> {
        self.routes.iter().find(|r| r.subnet == cidr)
    }

    pub fn control_plane(&self) -> ControlPlanePath {
        self.control_plane
    }

    /// Control plane traffic depends on NAT egress.
    pub fn nat_required_for_control_plane(&self) -> bool {
        self.control_plane == ControlPlanePath::Nat
    }

    pub fn privatelink_frontend(&self) -> bool {
        self.privatelink_frontend
    }

    /// Addresses covered by planned subnets.
    pub fn allocated_addresses(&self) -> u64 {
        self.subnets.iter().map(|s| s.cidr.size()).sum()
    }
}
