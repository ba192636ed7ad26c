//! The counter / logger walkthrough.
//!
//! 1. A zero-argument click counter on `Clicked` sees three clicks.
//! 2. A pointer logger on `Clicked + Hovered` sees a click and a hover but
//!    not a key press.
//! 3. A double click reaches the logger through the `Clicked` hierarchy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use announcements::{
    Action, ActionResult, Announcement, AnnouncementType, Announcer, Method,
};
use anyhow::{ensure, Context, Result};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

use crate::events::{Clicked, DoubleClicked, Hovered, KeyPressed};

/// Records the type name of every pointer announcement.
#[derive(Debug, Default)]
pub struct PointerLog {
    entries: Mutex<Vec<String>>,
}

impl PointerLog {
    pub fn record(&self, announcement: &dyn Announcement) -> ActionResult {
        self.entries
            .lock()
            .push(announcement.announcement_type().name().to_string());
        Ok(())
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

/// What the scenario observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    pub clicks: usize,
    pub pointer_log: Vec<String>,
    pub remaining_subscriptions: usize,
}

pub fn run(announcer: &Announcer) -> Result<ScenarioReport> {
    let clicks = Arc::new(AtomicUsize::new(0));
    let counter = {
        let clicks = clicks.clone();
        Action::nullary(move || {
            clicks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    };
    announcer
        .on(AnnouncementType::of::<Clicked>(), counter.clone())
        .context("Failed to subscribe click counter")?;

    for x in 0..3 {
        announcer
            .announce(Clicked { x, y: 0 })
            .context("Failed to announce click")?;
    }
    let click_total = clicks.load(Ordering::SeqCst);
    ensure!(click_total == 3, "expected 3 clicks, counted {click_total}");
    info!(clicks = click_total, "Click counter phase done");
    announcer.unsubscribe(&counter);

    let log = Arc::new(PointerLog::default());
    announcer
        .subscribe(AnnouncementType::of::<Clicked>() + AnnouncementType::of::<Hovered>())
        .send(Method::Unary(PointerLog::record), &log)
        .register()
        .context("Failed to subscribe pointer log")?;

    announcer.announce(Clicked { x: 4, y: 2 })?;
    announcer.announce(Hovered { x: 5, y: 2 })?;
    announcer.announce(KeyPressed { key: 'q' })?;
    let entries = log.entries();
    ensure!(
        entries == ["Clicked", "Hovered"],
        "pointer log should hold one click and one hover, got {entries:?}"
    );
    info!(entries = entries.len(), "Pointer log phase done");

    let double: DoubleClicked = announcer
        .announce_default()
        .context("Failed to announce double click")?;
    info!(?double, "Announced default double click");

    Ok(ScenarioReport {
        clicks: click_total,
        pointer_log: log.entries(),
        remaining_subscriptions: announcer.number_of_subscriptions(),
    })
}
