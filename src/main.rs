use clap::{Parser, ValueEnum};
use network_topology_planner::output::{plan_json, plan_print};
use network_topology_planner::PlanRequest;
use std::error::Error;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

/// Plan subnets, NAT gateways and routes for a multi-tier private network.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Plan request file (JSON)
    #[arg(short, long, env = "PLANNER_REQUEST")]
    request: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: Format,

    /// Also list unallocated blocks of the base
    #[arg(long)]
    free: bool,

    /// log4rs configuration file
    #[arg(long, default_value = "log4rs.yml")]
    log_config: PathBuf,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    let args = Args::parse();
    log4rs::init_file(&args.log_config, Default::default())
        .map_err(|e| format!("Error initializing log4rs from {}: {e}", args.log_config.display()))?;
    log::info!("#Start main()");

    let request = PlanRequest::read(&args.request)?.apply_env()?;
    let plan = request.plan().map_err(|e| {
        log::error!("Planning failed: {e}");
        e
    })?;

    match args.format {
        Format::Csv => plan_print(&plan, args.free)?,
        Format::Json => println!("{}", plan_json(&plan, args.free)?),
    }

    Ok(())
}
