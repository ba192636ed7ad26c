//! # Subscription Registry
//!
//! The subscriptions of one announcer, in registration order.
//!
//! Every mutation and the delivery snapshot take the registry lock; delivery
//! itself runs outside it, so actions may subscribe, unsubscribe or announce
//! again without deadlocking.

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::action::SubscriberId;
use crate::announcement::Announcement;
use crate::error::AnnouncerError;
use crate::subscription::Subscription;

/// Thread-safe collection of subscriptions.
pub struct SubscriptionRegistry {
    subscriptions: Mutex<Vec<Subscription>>,
    reclaim_on_deliver: bool,
}

impl SubscriptionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::with_reclaim_on_deliver(true)
    }

    /// Registry that prunes dead weak subscriptions on each delivery snapshot
    /// only when `enabled`.
    #[must_use]
    pub fn with_reclaim_on_deliver(enabled: bool) -> Self {
        Self {
            subscriptions: Mutex::new(Vec::new()),
            reclaim_on_deliver: enabled,
        }
    }

    /// Register a pending subscription.
    pub fn add(&self, subscription: Subscription) -> Result<Subscription, AnnouncerError> {
        let mut subscriptions = self.subscriptions.lock();
        subscription.activate()?;
        subscriptions.push(subscription.clone());
        debug!(
            subscription = %subscription.id(),
            matcher = %subscription.matcher(),
            weak = subscription.is_weak(),
            "Subscription added"
        );
        Ok(subscription)
    }

    /// Remove `subscription`. Returns `false` if it was not registered.
    pub fn remove(&self, subscription: &Subscription) -> bool {
        let removed = {
            let mut subscriptions = self.subscriptions.lock();
            let Some(index) = subscriptions.iter().position(|s| s == subscription) else {
                return false;
            };
            subscriptions.remove(index)
        };
        removed.retire();
        debug!(subscription = %subscription.id(), "Subscription removed");
        true
    }

    /// Remove every subscription of `subscriber`. Returns how many went.
    pub fn remove_subscriber(&self, subscriber: SubscriberId) -> usize {
        let removed = self.extract(|s| s.subscriber() == subscriber);
        if removed > 0 {
            debug!(?subscriber, removed, "Subscriber unsubscribed");
        }
        removed
    }

    /// Swap `old` for `new` at the same position.
    ///
    /// `new` must be pending; `old` is retired.
    pub fn replace(
        &self,
        old: &Subscription,
        new: &Subscription,
    ) -> Result<Subscription, AnnouncerError> {
        let mut subscriptions = self.subscriptions.lock();
        let index = subscriptions
            .iter()
            .position(|s| s == old)
            .ok_or(AnnouncerError::NotFound(old.id()))?;
        new.activate()?;
        let previous = std::mem::replace(&mut subscriptions[index], new.clone());
        drop(subscriptions);
        previous.retire();
        debug!(
            old = %old.id(),
            new = %new.id(),
            weak = new.is_weak(),
            "Subscription replaced"
        );
        Ok(new.clone())
    }

    /// Drop every subscription.
    pub fn reset(&self) {
        let drained: Vec<_> = self.subscriptions.lock().drain(..).collect();
        for subscription in &drained {
            subscription.retire();
        }
        debug!(removed = drained.len(), "Registry reset");
    }

    /// Remove weak subscriptions whose target is gone. Returns how many went.
    pub fn reclaim(&self) -> usize {
        let reclaimed = self.extract(|s| !s.is_alive());
        if reclaimed > 0 {
            debug!(reclaimed, "Reclaimed weak subscriptions");
        }
        reclaimed
    }

    /// Point-in-time copy of the registered subscriptions, in order.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.subscriptions.lock().clone()
    }

    /// Call `f` for each subscription of `subscriber`.
    ///
    /// Runs over a snapshot, so `f` may mutate the registry.
    pub fn subscriptions_of(&self, subscriber: SubscriberId, f: impl FnMut(&Subscription)) {
        self.subscriptions()
            .iter()
            .filter(|s| s.subscriber() == subscriber)
            .for_each(f);
    }

    #[must_use]
    pub fn number_of_subscriptions(&self) -> usize {
        self.subscriptions.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.lock().is_empty()
    }

    /// Deliver `announcement` to every registered subscription.
    ///
    /// A failing subscription does not stop the rest. The first failure is
    /// returned once all have been attempted; later ones are logged.
    pub fn deliver(&self, announcement: &dyn Announcement) -> Result<(), AnnouncerError> {
        let snapshot = self.snapshot();
        trace!(
            announcement = announcement.announcement_type().name(),
            subscriptions = snapshot.len(),
            "Delivering announcement"
        );

        let mut first_failure = None;
        for subscription in &snapshot {
            if let Err(error) = subscription.deliver(announcement) {
                if first_failure.is_none() {
                    first_failure = Some(error);
                } else {
                    warn!(
                        subscription = %subscription.id(),
                        error = %error,
                        "Additional delivery failure"
                    );
                }
            }
        }

        first_failure.map_or(Ok(()), Err)
    }

    fn snapshot(&self) -> Vec<Subscription> {
        let (snapshot, reclaimed) = {
            let mut subscriptions = self.subscriptions.lock();
            let reclaimed = if self.reclaim_on_deliver {
                drain_where(&mut subscriptions, |s| !s.is_alive())
            } else {
                Vec::new()
            };
            (subscriptions.clone(), reclaimed)
        };
        if !reclaimed.is_empty() {
            debug!(reclaimed = reclaimed.len(), "Reclaimed weak subscriptions");
        }
        snapshot
    }

    /// Removed subscriptions are dropped by the caller, after the lock is
    /// released, since dropping a target may run arbitrary code.
    fn extract(&self, predicate: impl Fn(&Subscription) -> bool) -> usize {
        let removed = drain_where(&mut self.subscriptions.lock(), predicate);
        removed.len()
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("subscriptions", &self.number_of_subscriptions())
            .field("reclaim_on_deliver", &self.reclaim_on_deliver)
            .finish()
    }
}

/// Remove and retire the matching subscriptions, keeping order of the rest.
fn drain_where(
    subscriptions: &mut Vec<Subscription>,
    predicate: impl Fn(&Subscription) -> bool,
) -> Vec<Subscription> {
    let (removed, kept): (Vec<_>, Vec<_>) =
        std::mem::take(subscriptions).into_iter().partition(|s| predicate(s));
    *subscriptions = kept;
    for subscription in &removed {
        subscription.retire();
    }
    removed
}
