//! # ARBOR Demo
//!
//! Headless run of the fixed-interval driver against the in-process engine.
//!
//! ```text
//! arbor_demo [config.toml] [frames]
//! ```
//!
//! Runs a short warm-up, injects a few scripted pointer events and a chat
//! line, then runs the remaining frames and logs a summary.
//! Set `LOG_LEVEL=debug` for per-frame output.

use std::process::ExitCode;

use arbor::demo::{DemoConfig, DemoEngine};
use arbor::telemetry::init_tracing;
use arbor::{EngineCoordinator, LoopDriver, PointerEvent, RenderLoop, ViewConfig, ViewError, ViewResult};
use tracing::{error, info};

/// Frames run when none are given on the command line.
const DEFAULT_FRAMES: u64 = 300;

/// Frames run before any input is injected, so handles exist to hit.
const WARMUP_FRAMES: u64 = 10;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "arbor_demo failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ViewResult<()> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => ViewConfig::load(&path)?,
        None => ViewConfig::arena(),
    };
    let frames = match args.next() {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|err| ViewError::InvalidConfig(format!("frame count {raw:?}: {err}")))?,
        None => DEFAULT_FRAMES,
    };

    info!(
        width = config.canvas_width,
        height = config.canvas_height,
        snapshot = ?config.snapshot,
        frames,
        "Starting ARBOR demo"
    );

    let engine = DemoEngine::new(DemoConfig {
        canvas: config.canvas(),
        ..DemoConfig::default()
    });
    let (client, sender) = EngineCoordinator::start(engine);
    let render_loop = RenderLoop::new(client, config.render_loop_config());
    let mut translator = config.translator();
    let mut driver = LoopDriver::new(render_loop, config.tick_interval());

    // === PHASE 1: Warm-up ===
    driver.set_frame_limit(Some(frames.min(WARMUP_FRAMES)));
    let warmup = driver.run().await;

    // === PHASE 2: Scripted input ===
    let canvas = config.canvas();
    let mut script = vec![
        PointerEvent::mouse_up(0.0, 0.0),
        PointerEvent::mouse_up(f64::from(canvas.width), f64::from(canvas.height)),
        PointerEvent::touch_start(-15.0, -15.0),
    ];
    if let Some(handle) = driver.render_loop().registry().iter().last() {
        let bounds = handle.surface_bounds(translator.transform());
        script.push(PointerEvent::mouse_up(
            bounds.x + bounds.width * 0.5,
            bounds.y + bounds.height * 0.5,
        ));
    }
    for event in &script {
        let command = translator.dispatch(event, driver.render_loop().registry(), &sender)?;
        info!(?event, ?command, "Injected pointer event");
    }
    sender.send("hello from arbor_demo")?;

    // === PHASE 3: Main run ===
    driver.set_frame_limit(Some(frames.saturating_sub(warmup.frames)));
    let report = driver.run().await;

    let render_loop = driver.render_loop();
    let feed = render_loop.feed();
    for line in feed.entries().iter().rev().take(5).rev() {
        info!(message = %line, "Feed");
    }
    info!(
        frames = warmup.frames + report.frames,
        reason = ?report.reason,
        handles = render_loop.registry().len(),
        messages = feed.len(),
        forwarded = translator.stats().forwarded,
        missed = translator.stats().missed,
        failed_ticks = report.stats.failed_ticks,
        worst_frame_us = report.stats.worst_frame_time_us,
        "ARBOR demo finished"
    );

    Ok(())
}
