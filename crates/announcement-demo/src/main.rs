//! # Announcement Demo
//!
//! Runs the counter / logger scenario against an announcer watched by a spy.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (from env)
//! 2. Load and validate the announcer configuration (from env)
//! 3. Attach the spy
//! 4. Run the scenario and print its report as JSON

use anyhow::{Context, Result};
use tracing::info;

use announcement_demo::scenario;
use announcement_spy::AnnouncementSpy;
use announcement_telemetry::{announcer_span, init_telemetry, TelemetryConfig};
use announcements::{Announcer, AnnouncerConfig};

fn main() -> Result<()> {
    let _telemetry = init_telemetry(TelemetryConfig::for_service("announcement-demo"))
        .context("Failed to initialize telemetry")?;

    let config = AnnouncerConfig::from_env();
    let announcer = Announcer::with_config(config).context("Invalid announcer configuration")?;
    let _span = announcer_span!("demo", announcer = %announcer.name()).entered();

    let spy = AnnouncementSpy::attach(&announcer).context("Failed to attach spy")?;
    info!(%spy, "Spy attached");

    let report = scenario::run(&announcer)?;
    info!(
        clicks = report.clicks,
        pointer_log = ?report.pointer_log,
        spied = spy.index(),
        "Scenario complete"
    );

    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to render report")?
    );
    Ok(())
}
