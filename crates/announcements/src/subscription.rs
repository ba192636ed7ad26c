//! # Subscriptions
//!
//! A subscription binds a matcher to a target (an [`Action`](crate::Action)
//! or a receiver-bound [`Method`](crate::Method)) and remembers which
//! subscriber it belongs to.
//!
//! ## Lifecycle
//!
//! ```text
//! Pending ──add──→ Active ──remove / replace / reset / reclaim──→ Removed
//! ```
//!
//! `make_weak` and `make_strong` never mutate a subscription: they build the
//! counterpart and swap it in through the registry, which retires the old
//! entry. A removed subscription is never registered again.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};
use tracing::trace;
use uuid::Uuid;

use crate::action::{SubscriberId, Target, WeakTarget};
use crate::announcement::{Announcement, AnnouncementType};
use crate::announcer::{Announcer, AnnouncerShared};
use crate::error::AnnouncerError;
use crate::set::AnnouncementMatcher;

/// Unique identity of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Where a subscription is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionState {
    /// Built but not registered yet.
    Pending,
    /// Registered with its announcer.
    Active,
    /// Removed, replaced or reclaimed. Terminal.
    Removed,
}

impl SubscriptionState {
    const PENDING: u8 = 0;
    const ACTIVE: u8 = 1;
    const REMOVED: u8 = 2;

    fn from_raw(raw: u8) -> Self {
        match raw {
            Self::PENDING => Self::Pending,
            Self::ACTIVE => Self::Active,
            _ => Self::Removed,
        }
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Removed => "removed",
        };
        f.write_str(label)
    }
}

enum Binding {
    Strong(Box<dyn Target>),
    Weak(Box<dyn WeakTarget>),
}

struct SubscriptionInner {
    id: SubscriptionId,
    announcer: Weak<AnnouncerShared>,
    matcher: AnnouncementMatcher,
    subscriber: SubscriberId,
    binding: Binding,
    state: AtomicU8,
}

/// Handle to a subscription.
///
/// Clones are the same subscription; equality is identity.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
}

impl Subscription {
    pub(crate) fn strong(
        announcer: Weak<AnnouncerShared>,
        matcher: AnnouncementMatcher,
        target: Box<dyn Target>,
    ) -> Self {
        let subscriber = target.subscriber();
        Self::build(announcer, matcher, subscriber, Binding::Strong(target))
    }

    pub(crate) fn weak(
        announcer: Weak<AnnouncerShared>,
        matcher: AnnouncementMatcher,
        target: &dyn Target,
    ) -> Self {
        let subscriber = target.subscriber();
        Self::build(announcer, matcher, subscriber, Binding::Weak(target.downgrade()))
    }

    fn build(
        announcer: Weak<AnnouncerShared>,
        matcher: AnnouncementMatcher,
        subscriber: SubscriberId,
        binding: Binding,
    ) -> Self {
        Self {
            inner: Arc::new(SubscriptionInner {
                id: SubscriptionId::new(),
                announcer,
                matcher,
                subscriber,
                binding,
                state: AtomicU8::new(SubscriptionState::PENDING),
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.inner.id
    }

    #[must_use]
    pub fn matcher(&self) -> &AnnouncementMatcher {
        &self.inner.matcher
    }

    /// Identity used by `unsubscribe`.
    #[must_use]
    pub fn subscriber(&self) -> SubscriberId {
        self.inner.subscriber
    }

    #[must_use]
    pub fn is_subscribed_by(&self, subscriber: impl Into<SubscriberId>) -> bool {
        self.inner.subscriber == subscriber.into()
    }

    #[must_use]
    pub fn is_weak(&self) -> bool {
        matches!(self.inner.binding, Binding::Weak(_))
    }

    #[must_use]
    pub fn state(&self) -> SubscriptionState {
        SubscriptionState::from_raw(self.inner.state.load(Ordering::Acquire))
    }

    /// `false` once the target of a weak subscription has been dropped.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        match &self.inner.binding {
            Binding::Strong(_) => true,
            Binding::Weak(target) => target.is_alive(),
        }
    }

    /// Returns `true` if this subscription listens for `announcement_type`.
    #[must_use]
    pub fn handles(&self, announcement_type: &AnnouncementType) -> bool {
        self.inner.matcher.handles(announcement_type)
    }

    /// The receiver of a method subscription, if it is an `R` and still alive.
    #[must_use]
    pub fn receiver<R: Any + Send + Sync>(&self) -> Option<Arc<R>> {
        let receiver = match &self.inner.binding {
            Binding::Strong(target) => target.receiver(),
            Binding::Weak(target) => target.upgrade()?.receiver(),
        }?;
        receiver.downcast::<R>().ok()
    }

    /// The announcer this subscription was created by.
    pub fn announcer(&self) -> Result<Announcer, AnnouncerError> {
        self.inner
            .announcer
            .upgrade()
            .map(Announcer::from_shared)
            .ok_or(AnnouncerError::Detached(self.inner.id))
    }

    /// Deliver `announcement` if this subscription handles its type.
    ///
    /// A weak subscription whose target is gone skips silently; the registry
    /// prunes it on its next snapshot.
    pub fn deliver(&self, announcement: &dyn Announcement) -> Result<(), AnnouncerError> {
        if !self.handles(&announcement.announcement_type()) {
            return Ok(());
        }

        match &self.inner.binding {
            Binding::Strong(target) => self.invoke(target.as_ref(), announcement),
            Binding::Weak(target) => match target.upgrade() {
                Some(target) => self.invoke(target.as_ref(), announcement),
                None => {
                    trace!(subscription = %self.inner.id, "Weak target gone, skipping delivery");
                    Ok(())
                }
            },
        }
    }

    fn invoke(
        &self,
        target: &dyn Target,
        announcement: &dyn Announcement,
    ) -> Result<(), AnnouncerError> {
        let announcer = if target.arity() == 2 {
            Some(self.announcer()?)
        } else {
            None
        };
        trace!(
            subscription = %self.inner.id,
            announcement = announcement.announcement_type().name(),
            "Delivering"
        );
        target.invoke(self.inner.id, announcement, announcer.as_ref())
    }

    /// Swap this subscription for a weak one holding its target by weak
    /// reference only.
    ///
    /// Returns `self` if already weak.
    pub fn make_weak(&self) -> Result<Subscription, AnnouncerError> {
        let Binding::Strong(target) = &self.inner.binding else {
            return Ok(self.clone());
        };
        let weak = self.counterpart(Binding::Weak(target.downgrade()));
        self.announcer()?.replace(self, &weak)
    }

    /// Swap this subscription for a strong one owning its target.
    ///
    /// Returns `self` if already strong. Fails with `Reclaimed` if the
    /// target is already gone.
    pub fn make_strong(&self) -> Result<Subscription, AnnouncerError> {
        let Binding::Weak(target) = &self.inner.binding else {
            return Ok(self.clone());
        };
        let target = target
            .upgrade()
            .ok_or(AnnouncerError::Reclaimed(self.inner.id))?;
        let strong = self.counterpart(Binding::Strong(target));
        self.announcer()?.replace(self, &strong)
    }

    fn counterpart(&self, binding: Binding) -> Subscription {
        Self::build(
            self.inner.announcer.clone(),
            self.inner.matcher.clone(),
            self.inner.subscriber,
            binding,
        )
    }

    /// Pending → Active. Fails for anything that is not pending.
    pub(crate) fn activate(&self) -> Result<(), AnnouncerError> {
        self.inner
            .state
            .compare_exchange(
                SubscriptionState::PENDING,
                SubscriptionState::ACTIVE,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(|raw| AnnouncerError::InvalidState {
                subscription: self.inner.id,
                state: SubscriptionState::from_raw(raw),
            })
    }

    pub(crate) fn retire(&self) {
        self.inner
            .state
            .store(SubscriptionState::REMOVED, Ordering::Release);
    }
}

impl PartialEq for Subscription {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Subscription {}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.inner.id)
            .field("matcher", &self.inner.matcher)
            .field("subscriber", &self.inner.subscriber)
            .field("weak", &self.is_weak())
            .field("state", &self.state())
            .finish()
    }
}
