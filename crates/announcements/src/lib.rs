//! # Announcements - Typed In-Process Publish/Subscribe
//!
//! Producers raise strongly-typed announcements; consumers subscribe to an
//! announcement type, a type and its descendants, or a set of types.
//!
//! ```text
//! ┌──────────────┐  announce()   ┌──────────────┐   snapshot    ┌───────────────┐
//! │   Producer   │ ────────────→ │  Announcer   │ ────────────→ │ Subscriptions │
//! └──────────────┘               │  (registry)  │               │ (in order)    │
//!                                └──────────────┘               └───────────────┘
//!                                       ↑ subscribe() / unsubscribe()
//!                                ┌──────────────┐
//!                                │  Consumers   │
//!                                └──────────────┘
//! ```
//!
//! ## Delivery
//!
//! - Synchronous: `announce` returns once every matching subscription ran.
//! - Registration order, over a snapshot taken under the registry lock.
//! - A failing subscription does not stop the others; the first failure is
//!   returned to the announcer's caller.
//!
//! ## Weak Subscriptions
//!
//! A weak subscription holds its target without keeping it alive. Once the
//! target is dropped the subscription is pruned on the next delivery snapshot
//! or [`Announcer::reclaim`] pass.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod action;
pub mod announcement;
pub mod announcer;
pub mod config;
pub mod error;
pub mod registry;
pub mod set;
pub mod subscription;

// Re-export main types
pub use action::{Action, ActionResult, Argument, Method, SubscriberId, WeakAction};
pub use announcement::{same_type, Announcement, AnnouncementClass, AnnouncementType, RootAnnouncement};
pub use announcer::{Announcer, SubscriptionBuilder};
pub use config::AnnouncerConfig;
pub use error::AnnouncerError;
pub use registry::SubscriptionRegistry;
pub use set::{AnnouncementMatcher, AnnouncementSet};
pub use subscription::{Subscription, SubscriptionId, SubscriptionState};
