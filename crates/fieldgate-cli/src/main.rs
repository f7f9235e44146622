use anyhow::Context;
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use fieldgate_guard::{PolicyStore, SimulationEngine, SINK_FILES};
use fieldgate_registry::DeviceRegistry;

#[derive(Parser)]
#[command(name = "fieldgate", version, about = "Telemetry policy-enforcement simulator")]
struct Cli {
    /// Number of simulation cycles to run
    #[arg(long, default_value_t = 3)]
    cycles: u32,

    /// Directory the four record trails are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Policy document (JSON, device_id -> {v, rules, override_on_alert});
    /// defaults to the built-in demo policies
    #[arg(long)]
    policies: Option<PathBuf>,

    /// Device document (JSON, device_id -> {user, role, trust_score});
    /// defaults to the built-in demo fleet
    #[arg(long)]
    devices: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let registry = match &cli.devices {
        Some(path) => {
            let doc = fs::read_to_string(path)
                .with_context(|| format!("reading device document {}", path.display()))?;
            DeviceRegistry::from_json(&doc)?
        }
        None => DeviceRegistry::demo(),
    };

    let policies = match &cli.policies {
        Some(path) => {
            let doc = fs::read_to_string(path)
                .with_context(|| format!("reading policy document {}", path.display()))?;
            PolicyStore::from_json(&doc)?
        }
        None => PolicyStore::demo(),
    };

    fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating output directory {}", cli.out_dir.display()))?;

    let mut engine = SimulationEngine::new(registry, policies, &cli.out_dir);
    engine
        .run(cli.cycles)
        .context("simulation aborted: record trail integrity cannot be guaranteed")?;

    println!("Simulation complete. Output written to:");
    for file in SINK_FILES {
        println!("- {}", cli.out_dir.join(file).display());
    }
    for device in engine.registry().iter() {
        println!(
            "Trust {}: {} ({})",
            device.device_id, device.trust_score, device.role
        );
    }

    Ok(())
}
