//! Entanglement-Swapping Demo
//!
//! Sweeps hop distance for each noise model and reports how well the
//! message survives two noisy links.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use qlink::LinkConfig;
use qlink_demos::swap::{NoiseKind, SwapReport, SwapSimulation};
use qlink_demos::{
    create_progress_bar, fidelity_bar, print_header, print_result, print_section, print_success,
};

#[derive(Parser, Debug)]
#[command(name = "demo-swap")]
#[command(about = "Teleport a qubit through an entanglement-swapping repeater")]
struct Args {
    /// Hop distances to sweep (km)
    #[arg(short, long, value_delimiter = ',', default_value = "0,1,2,5,10,20")]
    distances: Vec<f64>,

    /// Noise models to compare
    #[arg(short, long, value_enum, value_delimiter = ',',
          default_value = "ideal,thermal,linear-decay,depolarizing")]
    noise: Vec<NoiseKind>,

    /// Message angle θ for ry(θ)|0⟩
    #[arg(short, long, default_value = "1.1")]
    theta: f64,

    /// Sampled shots per sweep point
    #[arg(short, long, default_value = "8")]
    shots: usize,

    /// RNG seed for outcome sampling
    #[arg(long, default_value = "42")]
    seed: u64,

    /// YAML configuration file
    #[arg(short, long, env = "QLINK_CONFIG")]
    config: Option<PathBuf>,

    /// Print the sweep as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = LinkConfig::load(args.config.as_deref()).context("loading configuration")?;

    let level = if args.verbose { "debug" } else { config.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(?config, "starting entanglement-swapping sweep");

    let sim = SwapSimulation::new(&config, args.theta);
    let mut rng = StdRng::seed_from_u64(args.seed);

    let total = (args.noise.len() * args.distances.len()) as u64;
    let pb = (!args.json).then(|| create_progress_bar(total, "simulating"));

    let mut reports: Vec<SwapReport> = Vec::new();
    for &kind in &args.noise {
        for &distance in &args.distances {
            let report = sim
                .run(kind, distance, args.shots, &mut rng)
                .with_context(|| format!("{kind} noise at {distance} km"))?;
            reports.push(report);
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }
    }
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    print_header("Entanglement Swapping over Noisy Links");
    print_section("Setup");
    print_result("Message", format!("ry({:.3})|0⟩", args.theta));
    print_result("Bell pairs", "(q1, q2) and (q3, q4)");
    print_result("Shots per point", args.shots);

    for &kind in &args.noise {
        print_section(&format!("{kind} noise"));
        println!("  {:>8}  {:>8}  {:>8}  {:>6}", "km", "fidelity", "purity", "pure");
        for report in reports.iter().filter(|r| r.noise == kind) {
            let pure = report.shots.iter().filter(|s| s.pure).count();
            println!(
                "  {:>8.2}  {:>8.4}  {:>8.4}  {:>3}/{:<2} {}",
                report.distance,
                report.mean_fidelity,
                report.purity,
                pure,
                report.shots.len(),
                fidelity_bar(report.mean_fidelity, 20)
            );
        }
    }

    println!();
    print_success("Sweep complete");
    Ok(())
}
