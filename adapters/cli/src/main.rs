#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line run of the grid pathing game.
//!
//! Loads a catalog level, applies the requested blockers as if the player
//! had clicked them, raises the play intent, and ticks the session at 60 Hz
//! until the traversal completes, then prints the score.

use anyhow::{bail, Context, Result};
use clap::Parser;
use pathing_core::CellCoord;
use pathing_system_session::{LevelCatalog, SessionController, SessionInput};

const FRAME_SECONDS: f64 = 1.0 / 60.0;

/// A traversal over the largest catalog grid finishes in well under this
/// many frames; exceeding it means the animator never completed.
const FRAME_LIMIT: u32 = 100_000;

#[derive(Debug, Parser)]
#[command(name = "pathing", about = "Run a grid pathing level headlessly and print the score")]
struct Args {
    /// Level identifier from the built-in catalog.
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Cell to block before playing, as `x,y`. May be repeated.
    #[arg(long = "block", value_name = "X,Y", value_parser = parse_cell)]
    blocks: Vec<CellCoord>,
}

fn parse_cell(raw: &str) -> Result<CellCoord, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{raw}`"))?;
    let x = x
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("bad x coordinate in `{raw}`: {err}"))?;
    let y = y
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("bad y coordinate in `{raw}`: {err}"))?;
    Ok(CellCoord::new(x, y))
}

/// Entry point for the pathing command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let catalog = LevelCatalog::built_in();
    let definition = catalog
        .definition(args.level)
        .with_context(|| format!("available levels: {:?}", catalog.ids()))?
        .clone();

    let mut controller = SessionController::new();
    controller
        .load_level(definition)
        .context("catalog level failed validation")?;

    let mut now = 0.0_f64;

    // One click per frame, the way a pointer would deliver them.
    for &cell in &args.blocks {
        let _ = controller.update(
            now,
            SessionInput {
                toggle_cell: Some(cell),
            },
        );
        now += FRAME_SECONDS;
    }

    controller.request_play();

    let mut frames = 0_u32;
    while controller.last_score().is_none() {
        let _ = controller.update(now, SessionInput::default());
        now += FRAME_SECONDS;
        frames += 1;
        if frames > FRAME_LIMIT {
            bail!("traversal did not complete after {FRAME_LIMIT} frames");
        }
    }

    let score = controller
        .last_score()
        .context("traversal completed without a score")?;

    println!("level {}", args.level);
    println!("score: {}", score.score);
    println!(
        "targets hit: {}/{}{}",
        score.hit_target_count,
        score.target_count,
        if score.hit_all_targets { " (all)" } else { "" }
    );
    println!("blocks used: {}/{}", score.blocks_used, score.block_count);

    Ok(())
}
