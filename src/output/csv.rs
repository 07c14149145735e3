//! CSV output formatting for topology plans.

use super::terminal::{format_field, plan_summary};
use crate::models::{CidrError, Ipv4, RouteTarget, Subnet, TopologyPlan};
use crate::planning::free_space::free_blocks;
use colored::Colorize;
use std::error::Error;

/// One CSV row: a planned subnet or a free block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanPrintRow {
    /// Row counter (0 for free blocks).
    pub j: usize,
    /// `sub` for planned subnets, `-free-` for unallocated space.
    pub kind: String,
    pub tier: String,
    pub az: String,
    pub subnet_cidr: String,
    pub broadcast: String,
    /// Usable hosts after reserved addresses.
    pub hosts: u64,
    /// Default route target.
    pub route: String,
}

/// Build the rows for a plan, subnets in address order, optionally
/// interleaved with the free blocks between them.
pub fn plan_rows(plan: &TopologyPlan, include_free: bool) -> Result<Vec<PlanPrintRow>, CidrError> {
    let mut subnets: Vec<&Subnet> = plan.subnets().iter().collect();
    subnets.sort_by_key(|s| s.cidr);

    let free = if include_free { free_blocks(plan)? } else { Vec::new() };
    let mut free = free.into_iter().peekable();
    let mut rows = Vec::with_capacity(subnets.len());

    for (i, s) in subnets.iter().enumerate() {
        while let Some(block) = free.next_if(|b| *b < s.cidr) {
            rows.push(free_row(block));
        }
        rows.push(PlanPrintRow {
            j: i + 1,
            kind: "sub".to_string(),
            tier: s.tier.to_string(),
            az: s.az.clone(),
            subnet_cidr: s.cidr.to_string(),
            broadcast: s.cidr.hi().to_string(),
            hosts: s.usable_hosts(),
            route: route_label(plan, s),
        });
    }
    rows.extend(free.map(free_row));
    Ok(rows)
}

fn free_row(block: Ipv4) -> PlanPrintRow {
    PlanPrintRow {
        j: 0,
        kind: "-free-".to_string(),
        tier: "None".to_string(),
        az: "None".to_string(),
        subnet_cidr: block.to_string(),
        broadcast: block.hi().to_string(),
        hosts: block.usable_hosts().unwrap_or(0),
        route: "None".to_string(),
    }
}

fn route_label(plan: &TopologyPlan, subnet: &Subnet) -> String {
    match plan.route_for(subnet.cidr).map(|r| &r.target) {
        Some(RouteTarget::NatGateway { az, .. }) => format!("nat-{az}"),
        Some(RouteTarget::InternetGateway) => "igw".to_string(),
        None => "local".to_string(),
    }
}

/// Render one row as a CSV line.
pub fn format_row(row: &PlanPrintRow) -> String {
    format!(
        "{j},{kind},{tier},{az},{subnet_cidr},{broadcast},{hosts},{route}",
        j = format_field(row.j, 5),
        kind = format_field(&row.kind, 8),
        tier = format_field(&row.tier, 10),
        az = format_field(&row.az, 16),
        subnet_cidr = format_field(&row.subnet_cidr, 18),
        broadcast = format_field(format!("{}_br", row.broadcast), 19),
        hosts = format_field(format!("{}_hosts", row.hosts), 13),
        route = format_field(&row.route, 18),
    )
}

/// Print a plan as CSV to stdout.
pub fn plan_print(plan: &TopologyPlan, include_free: bool) -> Result<(), Box<dyn Error>> {
    log::info!("#Start plan_print() free blocks: {include_free}");

    println!(
        "#{}# {} generated {}",
        "PLAN".on_blue(),
        plan_summary(plan),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        r#"  "cnt",  "kind",    "tier",              "az",     "subnet_cidr",         "broadcast",      "hosts",           "route""#
    );
    for row in plan_rows(plan, include_free)? {
        println!("{}", format_row(&row));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FeatureToggles, SubnetTier, TierLayout};
    use crate::planning::plan;

    fn sample_plan() -> TopologyPlan {
        let tiers = TierLayout::new()
            .with(SubnetTier::Private, 2)
            .with_offset(SubnetTier::Public, 4, 12);
        plan(
            "10.0.0.0/24",
            &["us-east-1a", "us-east-1b"],
            &tiers,
            &FeatureToggles::premium_simulation(),
        )
        .expect("Error planning sample topology")
    }

    #[test]
    fn test_plan_rows_without_free() {
        let rows = plan_rows(&sample_plan(), false).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].subnet_cidr, "10.0.0.0/26");
        assert_eq!(rows[0].route, "nat-us-east-1a");
        assert_eq!(rows[0].hosts, 59);
        assert_eq!(rows[3].subnet_cidr, "10.0.0.208/28");
        assert_eq!(rows[3].route, "igw");
        assert_eq!(rows[3].broadcast, "10.0.0.223");
    }

    #[test]
    fn test_plan_rows_with_free() {
        let rows = plan_rows(&sample_plan(), true).unwrap();
        let cidrs: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.kind.as_str(), r.subnet_cidr.as_str()))
            .collect();
        assert_eq!(
            cidrs,
            vec![
                ("sub", "10.0.0.0/26"),
                ("sub", "10.0.0.64/26"),
                ("-free-", "10.0.0.128/26"),
                ("sub", "10.0.0.192/28"),
                ("sub", "10.0.0.208/28"),
                ("-free-", "10.0.0.224/27"),
            ]
        );
        assert_eq!(rows[2].j, 0);
        assert_eq!(rows[3].j, 3);
    }

    #[test]
    fn test_format_row() {
        let rows = plan_rows(&sample_plan(), false).unwrap();
        let line = format_row(&rows[0]);
        assert!(line.starts_with("  \"1\","), "{line}");
        assert!(line.contains("\"10.0.0.0/26\""));
        assert!(line.contains("\"59_hosts\""));
        assert_eq!(line.split(',').count(), 8);
    }
}
