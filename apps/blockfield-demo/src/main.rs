//! Blockfield headless demo
//!
//! Builds a world, walks a scripted player through it for a number of frames
//! against a recording scene, and prints what was streamed.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p blockfield-demo -- [OPTIONS]
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

mod args;

use blockfield_app::{init_logging, run_headless};
use tracing::info;

use crate::args::DemoArgs;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        print_help();
        return Ok(());
    }

    init_logging();
    let demo = DemoArgs::parse(&args)?;
    info!("Starting demo: {demo:?}");

    let summary = run_headless(demo.world_config(), &demo.headless_options())?;
    println!("{summary}");
    Ok(())
}

fn print_help() {
    eprintln!(
        "Blockfield headless demo

USAGE:
    cargo run -p blockfield-demo -- [OPTIONS]

WORLD OPTIONS:
    --seed <N>              World generation seed (default: 42)
    --render-distance <N>   Chunk radius kept loaded around the player (default: 4)
    --chunk-size <N>        Chunk edge length in blocks (default: 16)
    --stepping              Use block stepping collision instead of the height field
    --per-block             Hand blocks to the scene one by one
    --async                 Generate chunks on a background worker

RUN OPTIONS:
    --frames <N>            Frames to simulate (default: 600)
    --dig-every <N>         Remove the targeted block every N frames (default: off)
    --new-world-at <N>      Regenerate with seed + 1 after N frames

OTHER:
    -h, --help              Print this help message

EXAMPLES:
    # Default world
    cargo run -p blockfield-demo

    # Small world, stepping collision, per-block geometry
    cargo run -p blockfield-demo -- --render-distance 2 --stepping --per-block

ENVIRONMENT VARIABLES:
    RUST_LOG                Set log level (e.g., info, debug, trace)"
    );
}
