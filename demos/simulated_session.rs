//! Full control-surface session against the simulated client library.
//!
//! Demonstrates:
//! - Version detection and the resolved compatibility plan
//! - Transport toggles forcing support off
//! - Connect / disconnect / client-event buttons through the command loop
//! - Log panel visibility
//!
//! Usage:
//!   cargo run --example simulated_session
//!   cargo run --example simulated_session -- 1.3.0
//!   cargo run --example simulated_session -- 3.1.0 --encrypted --debug

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use anyhow::{Context, Result};
use pusher_compat::library::SimulatedLibrary;
use pusher_compat::session::{MemorySurface, Session};
use pusher_compat::{LogCategory, SessionConfig, Version};
use serde_json::json;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let debug = args.iter().any(|a| a == "--debug");
    init_logging(debug);

    if let Err(e) = run(&args).await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "pusher_compat=trace"
    } else {
        "pusher_compat=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

async fn run(args: &[String]) -> Result<()> {
    let version: Version = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map_or("2.1.0", String::as_str)
        .parse()
        .context("parsing version argument")?;
    let encrypted = args.iter().any(|a| a == "--encrypted");

    println!("=== Simulated session: library {version} ===\n");

    // ========================================================================
    // Start
    // ========================================================================

    let library = Arc::new(SimulatedLibrary::new(version).with_default_transports());
    let surface = MemorySurface::standard();

    let config = SessionConfig::from_json(
        &json!({
            "key": "demo-key",
            "name": "local",
            "encrypted": encrypted,
            "enabledTransports": { "ws": true, "sockjs": true, "xhr_polling": true },
            "enabledLogCategories": { "debug": true }
        })
        .to_string(),
    )?;

    let session = Session::start(config, library.clone(), surface.surface())?;
    let plan = *session.plan();
    println!("[Plan] profile={:?} status={:?}", plan.profile, plan.status_binding);
    println!(
        "       registry={:?} transports={:?}",
        plan.registry_shape,
        session.registry().names().collect::<Vec<_>>()
    );

    let client = library.client().context("library opened no client")?;

    // ========================================================================
    // Toggle ws off, let the deferred connect run
    // ========================================================================

    if let Some(ws) = surface.board.transport("ws") {
        ws.click();
        println!("[Toggle] ws forced off: {}", session.overrides().is_forced_off("ws"));
    }
    client.run_pending();
    println!("[Connect] active transport: {:?}", client.active_transport());

    // ========================================================================
    // Buttons through the command loop
    // ========================================================================

    let (handle, task) = session.spawn();

    handle.disconnect()?;
    handle.connect()?;
    match handle.trigger_client_event().await {
        Ok(accepted) => println!("[Client event] accepted: {accepted}"),
        Err(e) => println!("[Client event] {e}"),
    }

    if let Some(channel) = client.channel("presence-channel") {
        channel.emit("event", &json!({ "text": "hello from server" }));
        channel.emit("alert", &json!("maintenance at noon"));
    }

    handle.shutdown()?;
    let session = task.await.context("session loop panicked")?;

    // ========================================================================
    // Report
    // ========================================================================

    println!("\n[Status] {:?}", surface.status.history());
    println!("[Alerts] {:?}", surface.notifier.alerts());

    session.log().set_visibility(LogCategory::Debug, false);
    println!("\n[Log] {} entries, debug hidden:", session.log().len());
    for entry in session.log().visible_entries() {
        println!("  {:<8} {}", entry.category.as_str(), entry.payload);
    }

    Ok(())
}
