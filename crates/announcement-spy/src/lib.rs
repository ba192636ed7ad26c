//! # Announcement Spy
//!
//! Records and logs every announcement passing through an announcer.
//!
//! The spy subscribes weakly to [`RootAnnouncement`], so it sees everything
//! and never keeps itself alive: dropping the last `Arc` of the spy is enough
//! to stop it.
//!
//! ```rust,ignore
//! let spy = AnnouncementSpy::attach(&announcer)?;
//! announcer.announce(Clicked::default())?;
//! assert_eq!(spy.index(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use announcements::{
    ActionResult, Announcement, AnnouncementType, Announcer, AnnouncerError, Method,
    RootAnnouncement,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

/// One announcement seen by the spy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpyRecord {
    /// Name of the announcer that delivered it.
    pub announcer: String,
    /// Announcement type name.
    pub announcement: String,
    /// `Debug` rendering of the instance.
    pub detail: String,
}

#[derive(Default)]
struct SpyState {
    announcer: Option<Announcer>,
    records: Vec<SpyRecord>,
    index: usize,
}

/// Weak subscriber logging every announcement of its announcer.
pub struct AnnouncementSpy {
    state: Mutex<SpyState>,
}

impl AnnouncementSpy {
    /// A spy watching `announcer`.
    pub fn attach(announcer: &Announcer) -> Result<Arc<Self>, AnnouncerError> {
        let spy = Arc::new(Self {
            state: Mutex::new(SpyState::default()),
        });
        spy.set_announcer(announcer)?;
        Ok(spy)
    }

    /// Watch `announcer` instead of the current one.
    ///
    /// Subscribes weakly to the root type of `announcer` first; only once
    /// that succeeds is the previous announcer dropped and unsubscribed from.
    pub fn set_announcer(self: &Arc<Self>, announcer: &Announcer) -> Result<(), AnnouncerError> {
        let current = self.state.lock().announcer.clone();
        if current.as_ref() == Some(announcer) {
            announcer.unsubscribe(self);
        }

        announcer
            .subscribe(AnnouncementType::of::<RootAnnouncement>())
            .send(Method::Unary(Self::announce), self)
            .weak()
            .register()?;

        let previous = self.state.lock().announcer.replace(announcer.clone());
        if let Some(previous) = previous.filter(|previous| previous != announcer) {
            previous.unsubscribe(self);
        }
        Ok(())
    }

    /// The subscribed action: record and log `announcement`.
    pub fn announce(&self, announcement: &dyn Announcement) -> ActionResult {
        let mut state = self.state.lock();
        let announcer = state
            .announcer
            .as_ref()
            .map(|announcer| announcer.name().to_string())
            .unwrap_or_default();
        info!(
            announcer = %announcer,
            announcement = ?announcement,
            "Incoming announcement"
        );
        state.records.push(SpyRecord {
            announcer,
            announcement: announcement.announcement_type().name().to_string(),
            detail: format!("{announcement:?}"),
        });
        state.index = state.records.len();
        Ok(())
    }

    /// Forget the recorded announcements. `index` keeps its value until the
    /// next announcement arrives.
    pub fn clear(&self) {
        self.state.lock().records.clear();
    }

    #[must_use]
    pub fn announcer(&self) -> Option<Announcer> {
        self.state.lock().announcer.clone()
    }

    /// Recorded announcements, oldest first.
    #[must_use]
    pub fn announcements(&self) -> Vec<SpyRecord> {
        self.state.lock().records.clone()
    }

    /// Number of recorded announcements as of the last one received.
    #[must_use]
    pub fn index(&self) -> usize {
        self.state.lock().index
    }

    /// The recorded log as a JSON array.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.state.lock().records)
    }
}

impl fmt::Display for AnnouncementSpy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state.lock().announcer {
            Some(announcer) => write!(f, "<AnnouncementSpy announcer={announcer}>"),
            None => f.write_str("<AnnouncementSpy announcer=none>"),
        }
    }
}

impl fmt::Debug for AnnouncementSpy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AnnouncementSpy")
            .field("announcer", &state.announcer)
            .field("records", &state.records.len())
            .field("index", &state.index)
            .finish()
    }
}
