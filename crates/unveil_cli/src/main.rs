//! Unveil CLI
//!
//! Simulate scroll sessions over scene files and inspect easing curves.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use unveil_animation::Easing;
use unveil_trigger::Activation;

mod report;
mod scene;

use report::Report;
use scene::Scene;

#[derive(Parser)]
#[command(name = "unveil")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Scroll-driven animation engine CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scroll through a scene and print every delivered update
    Simulate {
        /// Scene file (TOML)
        scene: PathBuf,

        /// Starting scroll position
        #[arg(long, default_value = "0")]
        from: f32,

        /// Final scroll position (defaults to the bottom of the page)
        #[arg(long)]
        to: Option<f32>,

        /// Pixels scrolled per step
        #[arg(long, default_value = "40")]
        step: f32,

        /// Frame duration in milliseconds
        #[arg(long, default_value = "16")]
        frame_ms: f32,

        /// Frames rendered after each scroll step
        #[arg(long, default_value = "4")]
        frames: u32,

        /// Time to keep ticking once scrolling stops, in milliseconds
        #[arg(long, default_value = "1000")]
        settle_ms: f32,

        /// Print JSON lines instead of text
        #[arg(long)]
        json: bool,
    },

    /// Load a scene and print its resolved triggers
    Check {
        /// Scene file (TOML)
        scene: PathBuf,
    },

    /// Print samples of an easing curve
    Easing {
        /// Curve name, e.g. `power2.out` or `cubic-bezier(0.4, 0, 0.2, 1)`
        name: String,

        /// Number of intervals to sample
        #[arg(short, long, default_value = "10")]
        samples: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG takes precedence over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Simulate {
            scene,
            from,
            to,
            step,
            frame_ms,
            frames,
            settle_ms,
            json,
        } => cmd_simulate(
            &scene,
            Session {
                from,
                to,
                step,
                frame_ms,
                frames,
                settle_ms,
                json,
            },
        ),

        Commands::Check { scene } => cmd_check(&scene),

        Commands::Easing { name, samples } => cmd_easing(&name, samples),
    }
}

struct Session {
    from: f32,
    to: Option<f32>,
    step: f32,
    frame_ms: f32,
    frames: u32,
    settle_ms: f32,
    json: bool,
}

/// Scroll positions from `from` to `to` inclusive, `step` apart
fn scroll_positions(from: f32, to: f32, step: f32) -> Vec<f32> {
    let distance = (to - from).abs();
    let direction = if to >= from { 1.0 } else { -1.0 };
    let count = (distance / step).ceil() as usize;
    (0..=count)
        .map(|i| from + direction * (i as f32 * step).min(distance))
        .collect()
}

fn cmd_simulate(path: &Path, session: Session) -> Result<()> {
    if !(session.step > 0.0) {
        bail!("--step must be positive");
    }
    if !(session.frame_ms > 0.0) {
        bail!("--frame-ms must be positive");
    }

    let scene = Scene::load(path)?;
    let mut stage = scene.build()?;
    let to = session.to.unwrap_or_else(|| scene.scroll_extent());

    info!(
        "Simulating {} ({} triggers) from {} to {}",
        path.display(),
        stage.order.len(),
        session.from,
        to
    );

    let mut report = Report::new(&stage, session.json);
    for y in scroll_positions(session.from, to, session.step) {
        report.set_scroll(y);
        stage.registry.scroll_to(y, &mut report);
        for _ in 0..session.frames {
            report.advance(session.frame_ms);
            stage.registry.tick(session.frame_ms, &mut report);
        }
    }

    let mut settled = 0.0;
    while settled < session.settle_ms {
        report.advance(session.frame_ms);
        stage.registry.tick(session.frame_ms, &mut report);
        settled += session.frame_ms;
    }

    let totals = report.totals();
    info!(
        applies = totals.applies,
        enters = totals.enters,
        leaves = totals.leaves,
        fires = totals.fires,
        counter_updates = totals.counter_updates,
        "Simulation finished"
    );
    for id in &stage.order {
        let label = &stage.triggers[*id].label;
        match stage.registry.trigger_state(*id) {
            Some(state) => info!("  {label}: {state:?}"),
            None => info!("  {label}: disposed"),
        }
    }

    Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
    let scene = Scene::load(path)?;
    let stage = scene.build()?;

    info!("Checking scene: {}", path.display());
    println!(
        "{} targets, {} timelines, {} triggers",
        scene.targets.len(),
        scene.timelines.len(),
        stage.order.len()
    );
    println!(
        "viewport {}x{}, scrollable to {}",
        scene.viewport.width,
        scene.viewport.height,
        scene.scroll_extent()
    );
    println!();

    for id in &stage.order {
        let trigger = &stage.triggers[*id];
        let config = &trigger.config;
        let mut line = format!("{}:", trigger.label);
        match config.activation {
            Activation::Visibility { amount, margin } => {
                let amount = amount.unwrap_or(scene.engine.default_amount);
                line.push_str(&format!(" visible {:.0}%", amount * 100.0));
                if margin != 0.0 {
                    line.push_str(&format!(" margin {margin:+.0}px"));
                }
            }
            Activation::Scroll { .. } => {
                if let Some((start, end)) = stage.registry.window(*id) {
                    line.push_str(&format!(" scroll {start}..{end}"));
                }
            }
        }
        if config.pin {
            line.push_str(if config.pin_spacing { " pin" } else { " pin (no spacing)" });
        }
        line.push_str(&format!(" scrub={:?} fire={:?}", config.scrub, config.fire));
        if !config.scrub.is_scrubbed() {
            line.push_str(&format!(" actions=\"{}\"", config.actions));
        }
        if let Some(span) = trigger.span {
            line.push_str(&format!(" span={span:.2}s x{}", trigger.members));
        }
        println!("{line}");
    }

    Ok(())
}

fn cmd_easing(name: &str, samples: usize) -> Result<()> {
    let easing: Easing = name.parse()?;
    let samples = samples.max(1);

    println!("{easing}");
    for i in 0..=samples {
        let t = i as f32 / samples as f32;
        let value = easing.apply(t);
        let bar = "#".repeat((value.clamp(0.0, 1.2) * 40.0).round() as usize);
        println!("{t:>5.2}  {value:>7.4}  {bar}");
    }

    Ok(())
}
