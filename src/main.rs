mod error;
mod inspect;
mod replay;
mod scenario;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use renderview::geometry::BoxParams;

use crate::error::CliError;
use crate::inspect::BoxReport;
use crate::replay::Replay;
use crate::scenario::Scenario;

#[derive(Parser, Debug)]
#[command(name = "vista", about = "Render-view routing replay and geometry inspection")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scenario's steps and print one record per step.
    Route(RouteArgs),
    /// Print the buffers a box produces.
    Box(BoxArgs),
}

#[derive(Args, Debug)]
struct RouteArgs {
    #[arg(long, env = "VISTA_SCENARIO")]
    scenario: PathBuf,

    /// Override the scenario's canvas width.
    #[arg(long, env = "VISTA_CANVAS_WIDTH", requires = "canvas_height")]
    canvas_width: Option<f64>,

    #[arg(long, env = "VISTA_CANVAS_HEIGHT", requires = "canvas_width")]
    canvas_height: Option<f64>,

    /// Print one pretty JSON array instead of JSON lines.
    #[arg(long, env = "VISTA_PRETTY")]
    pretty: bool,
}

#[derive(Args, Debug)]
struct BoxArgs {
    #[arg(long, default_value_t = 1.0)]
    width: f32,
    #[arg(long, default_value_t = 1.0)]
    height: f32,
    #[arg(long, default_value_t = 1.0)]
    depth: f32,
    /// Segments along every axis.
    #[arg(long, default_value_t = 1)]
    segments: u32,
    /// Include positions, normals, uvs and indices.
    #[arg(long)]
    full: bool,
    #[arg(long, env = "VISTA_PRETTY")]
    pretty: bool,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();

    match cli.command {
        Command::Route(args) => run_route(&args),
        Command::Box(args) => run_box(&args),
    }
}

fn run_route(args: &RouteArgs) -> Result<(), CliError> {
    let scenario = Scenario::load(&args.scenario)?;
    let canvas = args.canvas_width.zip(args.canvas_height);
    let mut replay = Replay::new(&scenario, canvas)?;
    let records = replay.run(&scenario.steps)?;
    info!(
        path = %args.scenario.display(),
        steps = records.len(),
        frames = replay.view().frame(),
        "replay finished"
    );

    if args.pretty {
        print_pretty(&records)
    } else {
        for record in &records {
            println!("{}", serde_json::to_string(record)?);
        }
        Ok(())
    }
}

fn run_box(args: &BoxArgs) -> Result<(), CliError> {
    let params = BoxParams {
        width: args.width,
        height: args.height,
        depth: args.depth,
        width_segments: args.segments,
        height_segments: args.segments,
        depth_segments: args.segments,
    };
    let report = BoxReport::new(params, args.full);
    info!(vertices = report.vertices, triangles = report.triangles, "box built");

    if args.pretty {
        print_pretty(&report)
    } else {
        println!("{}", serde_json::to_string(&report)?);
        Ok(())
    }
}

fn print_pretty(value: &impl Serialize) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
