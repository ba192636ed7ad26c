//! Mock announcement types and receivers shared by the integration suites.
//!
//! ```text
//! RootAnnouncement
//!   ├── AnnouncementMockA
//!   └── AnnouncementMockB
//!         └── AnnouncementMockC
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use announcements::{announcement, ActionResult, Announcement, AnnouncementType};
use parking_lot::Mutex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementMockA {
    pub value: u32,
}
announcement!(AnnouncementMockA);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementMockB;
announcement!(AnnouncementMockB);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnouncementMockC;
announcement!(AnnouncementMockC: AnnouncementMockB);

pub fn mock_a() -> AnnouncementType {
    AnnouncementType::of::<AnnouncementMockA>()
}

pub fn mock_b() -> AnnouncementType {
    AnnouncementType::of::<AnnouncementMockB>()
}

pub fn mock_c() -> AnnouncementType {
    AnnouncementType::of::<AnnouncementMockC>()
}

/// Receiver counting and naming everything it is sent.
#[derive(Debug, Default)]
pub struct Receiver {
    hits: AtomicUsize,
    seen: Mutex<Vec<&'static str>>,
}

impl Receiver {
    pub fn receive(&self, announcement: &dyn Announcement) -> ActionResult {
        self.hits.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(announcement.announcement_type().name());
        Ok(())
    }

    pub fn ping(&self) -> ActionResult {
        self.hits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<&'static str> {
        self.seen.lock().clone()
    }
}
