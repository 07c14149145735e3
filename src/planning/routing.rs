//! Routing facts derived from the feature toggles.

use crate::error::PlanError;
use crate::models::{
    ControlPlanePath, FeatureToggles, NatGateway, NatMode, RouteFact, RouteTarget, Routing, Subnet,
    SubnetTier,
};

/// Place NAT gateways, compute default routes and the control-plane path.
///
/// # Arguments
/// * `subnets` - Every planned subnet, in any order
/// * `toggles` - Validated feature toggles
///
/// # Returns
/// * `Ok(Routing)` - Private subnets route `0.0.0.0/0` to their NAT gateway when
///   NAT is on, public subnets to the internet gateway when it is on, endpoint
///   subnets get no default route
/// * `Err(PlanError)` - NAT has no public subnet to live in, a private subnet
///   would reach the internet gateway, or private egress is required and no
///   path exists
pub fn derive_routing(subnets: &[Subnet], toggles: &FeatureToggles) -> Result<Routing, PlanError> {
    let private: Vec<&Subnet> = subnets.iter().filter(|s| s.tier == SubnetTier::Private).collect();
    let public: Vec<&Subnet> = subnets.iter().filter(|s| s.tier == SubnetTier::Public).collect();

    let nat_gateways = if toggles.enable_nat() {
        place_nat_gateways(&public, toggles.nat_mode())?
    } else {
        Vec::new()
    };

    let mut routes = Vec::with_capacity(private.len() + public.len());
    if toggles.enable_nat() {
        for subnet in &private {
            let nat = nat_for(subnet, &nat_gateways, &public, toggles.nat_mode())?;
            routes.push(RouteFact::default_route(
                subnet,
                RouteTarget::NatGateway {
                    az: nat.az.clone(),
                    subnet: nat.subnet,
                },
            ));
        }
    }
    if toggles.enable_internet_gateway() {
        for subnet in &public {
            routes.push(RouteFact::default_route(subnet, RouteTarget::InternetGateway));
        }
    }
    check_no_private_internet_route(&routes)?;

    let control_plane = if toggles.enable_privatelink_backend() {
        ControlPlanePath::PrivateLink
    } else if toggles.enable_nat() {
        ControlPlanePath::Nat
    } else {
        ControlPlanePath::Unrouted
    };
    if control_plane == ControlPlanePath::Unrouted && toggles.require_private_egress() {
        return Err(PlanError::PrivateEgressUnavailable);
    }
    log::debug!(
        "routing: {} NAT gateway(s), {} default route(s), control plane via {:?}",
        nat_gateways.len(),
        routes.len(),
        control_plane
    );

    Ok(Routing {
        nat_gateways,
        internet_gateway: toggles.enable_internet_gateway(),
        routes,
        control_plane,
        privatelink_frontend: toggles.enable_privatelink_frontend(),
    })
}

fn place_nat_gateways(public: &[&Subnet], mode: NatMode) -> Result<Vec<NatGateway>, PlanError> {
    if public.is_empty() {
        return Err(PlanError::MissingTier {
            tier: SubnetTier::Public,
            reason: "NAT gateways are hosted in public subnets".to_string(),
        });
    }
    let hosts: Vec<&&Subnet> = match mode {
        NatMode::PerAz => public.iter().collect(),
        NatMode::Single => public.iter().take(1).collect(),
    };
    Ok(hosts
        .into_iter()
        .map(|s| NatGateway {
            az: s.az.clone(),
            subnet: s.cidr,
        })
        .collect())
}

/// NAT gateway serving a private subnet: the one in the public subnet with
/// the same AZ index, or the shared one.
fn nat_for<'a>(
    private: &Subnet,
    nat_gateways: &'a [NatGateway],
    public: &[&Subnet],
    mode: NatMode,
) -> Result<&'a NatGateway, PlanError> {
    let nat = match mode {
        NatMode::Single => nat_gateways.first(),
        NatMode::PerAz => public
            .iter()
            .find(|p| p.index == private.index)
            .and_then(|host| nat_gateways.iter().find(|n| n.subnet == host.cidr)),
    };
    nat.ok_or_else(|| PlanError::MissingTier {
        tier: SubnetTier::Public,
        reason: format!("no NAT gateway for {private}"),
    })
}

/// Fail if any private subnet routes to the internet gateway.
pub fn check_no_private_internet_route(routes: &[RouteFact]) -> Result<(), PlanError> {
    match routes
        .iter()
        .find(|r| r.tier == SubnetTier::Private && r.target == RouteTarget::InternetGateway)
    {
        Some(route) => Err(PlanError::SecurityInvariantViolation(format!(
            "private subnet {} in {} routes {} to the internet gateway",
            route.subnet, route.az, route.destination
        ))),
        None => Ok(()),
    }
}
