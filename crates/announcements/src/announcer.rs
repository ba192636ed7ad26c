//! # Announcer
//!
//! The facade producers and consumers talk to. An announcer owns exactly one
//! [`SubscriptionRegistry`] for its whole lifetime.
//!
//! ```ignore
//! let announcer = Announcer::new();
//! announcer.on(AnnouncementType::of::<Clicked>(), Action::nullary(|| Ok(())))?;
//! announcer.subscribe(AnnouncementType::of::<Clicked>())
//!     .send(Method::Unary(Log::record), &log)
//!     .register()?;
//! announcer.announce(Clicked::default())?;
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use tracing::debug;

use crate::action::{Action, BoundMethod, Method, SubscriberId, Target};
use crate::announcement::{Announcement, AnnouncementClass};
use crate::config::AnnouncerConfig;
use crate::error::AnnouncerError;
use crate::registry::SubscriptionRegistry;
use crate::set::AnnouncementMatcher;
use crate::subscription::Subscription;

pub(crate) struct AnnouncerShared {
    config: AnnouncerConfig,
    registry: SubscriptionRegistry,
}

/// Per-scope announcement hub.
///
/// Cheap to clone; clones share the registry. Equality is identity.
#[derive(Clone)]
pub struct Announcer {
    shared: Arc<AnnouncerShared>,
}

impl Announcer {
    /// Announcer with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(AnnouncerConfig::default())
    }

    pub fn with_config(config: AnnouncerConfig) -> Result<Self, AnnouncerError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: AnnouncerConfig) -> Self {
        let registry = SubscriptionRegistry::with_reclaim_on_deliver(config.reclaim_on_deliver);
        Self {
            shared: Arc::new(AnnouncerShared { config, registry }),
        }
    }

    pub(crate) fn from_shared(shared: Arc<AnnouncerShared>) -> Self {
        Self { shared }
    }

    fn downgrade(&self) -> Weak<AnnouncerShared> {
        Arc::downgrade(&self.shared)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.config.name
    }

    #[must_use]
    pub fn config(&self) -> &AnnouncerConfig {
        &self.shared.config
    }

    #[must_use]
    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.shared.registry
    }

    /// Start a subscription to `matcher`.
    ///
    /// Exactly one of [`SubscriptionBuilder::action`] or
    /// [`SubscriptionBuilder::send`] must be given before registering.
    pub fn subscribe(&self, matcher: impl Into<AnnouncementMatcher>) -> SubscriptionBuilder<'_> {
        SubscriptionBuilder {
            announcer: self,
            matcher: matcher.into(),
            action: None,
            method: None,
            weak: false,
        }
    }

    /// Subscribe `action` to `matcher`. The action is its own subscriber.
    pub fn on(
        &self,
        matcher: impl Into<AnnouncementMatcher>,
        action: Action,
    ) -> Result<Subscription, AnnouncerError> {
        self.subscribe(matcher).action(action).register()
    }

    /// Deliver `announcement` to every matching subscription and hand it back.
    ///
    /// With no subscriptions this does nothing. If any subscription fails the
    /// first failure is returned after all of them were attempted.
    pub fn announce<A: Announcement>(&self, announcement: A) -> Result<A, AnnouncerError> {
        self.announce_dyn(&announcement)?;
        Ok(announcement)
    }

    /// Announce a default instance of `A`.
    pub fn announce_default<A: AnnouncementClass + Default>(&self) -> Result<A, AnnouncerError> {
        self.announce(A::default())
    }

    /// Announce an already type-erased announcement.
    pub fn announce_dyn(&self, announcement: &dyn Announcement) -> Result<(), AnnouncerError> {
        if !self.has_subscriptions() {
            return Ok(());
        }
        self.shared.registry.deliver(announcement)
    }

    /// Remove every subscription whose subscriber is `subscriber`.
    pub fn unsubscribe(&self, subscriber: impl Into<SubscriberId>) -> usize {
        self.shared.registry.remove_subscriber(subscriber.into())
    }

    /// Remove a single subscription. No-op if it is not registered here.
    pub fn remove_subscription(&self, subscription: &Subscription) -> bool {
        self.shared.registry.remove(subscription)
    }

    /// Swap `old` for `new` in place.
    pub fn replace(
        &self,
        old: &Subscription,
        new: &Subscription,
    ) -> Result<Subscription, AnnouncerError> {
        self.shared.registry.replace(old, new)
    }

    /// Remove weak subscriptions whose target was dropped.
    pub fn reclaim(&self) -> usize {
        self.shared.registry.reclaim()
    }

    /// Remove every subscription.
    pub fn reset(&self) {
        self.shared.registry.reset();
    }

    #[must_use]
    pub fn has_subscriptions(&self) -> bool {
        !self.shared.registry.is_empty()
    }

    #[must_use]
    pub fn number_of_subscriptions(&self) -> usize {
        self.shared.registry.number_of_subscriptions()
    }

    /// Call `f` for each subscription of `subscriber`.
    pub fn subscriptions_of(
        &self,
        subscriber: impl Into<SubscriberId>,
        f: impl FnMut(&Subscription),
    ) {
        self.shared.registry.subscriptions_of(subscriber.into(), f);
    }
}

impl Default for Announcer {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Announcer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for Announcer {}

impl fmt::Debug for Announcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Announcer")
            .field("name", &self.name())
            .field("registry", &self.shared.registry)
            .finish()
    }
}

impl fmt::Display for Announcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pending subscribe call returned by [`Announcer::subscribe`].
#[must_use = "a subscription is only registered by `register`"]
pub struct SubscriptionBuilder<'a> {
    announcer: &'a Announcer,
    matcher: AnnouncementMatcher,
    action: Option<Action>,
    method: Option<Box<dyn Target>>,
    weak: bool,
}

impl SubscriptionBuilder<'_> {
    /// Run `action` on delivery. The action is the subscriber.
    pub fn action(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    /// Call `method` on `receiver` on delivery. The receiver is the
    /// subscriber.
    pub fn send<R: Send + Sync + 'static>(mut self, method: Method<R>, receiver: &Arc<R>) -> Self {
        self.method = Some(Box::new(BoundMethod::new(receiver.clone(), method)));
        self
    }

    /// Register as a weak subscription right away.
    pub fn weak(mut self) -> Self {
        self.weak = true;
        self
    }

    /// Register the subscription with the announcer.
    pub fn register(self) -> Result<Subscription, AnnouncerError> {
        let announcer = self.announcer;
        let subscription = self.build()?;
        debug!(
            announcer = %announcer,
            subscription = %subscription.id(),
            "Subscribing"
        );
        announcer.shared.registry.add(subscription)
    }

    /// Build a pending subscription without registering it.
    ///
    /// The result can be handed to [`Announcer::replace`] or
    /// [`SubscriptionRegistry::add`] later.
    pub fn build(self) -> Result<Subscription, AnnouncerError> {
        let target: Box<dyn Target> = match (self.action, self.method) {
            (Some(action), None) => Box::new(action),
            (None, Some(method)) => method,
            (Some(_), Some(_)) => {
                return Err(AnnouncerError::Configuration(
                    "subscribe takes an action or a method with its receiver, not both"
                        .to_string(),
                ))
            }
            (None, None) => {
                return Err(AnnouncerError::Configuration(
                    "subscribe needs an action or a method with its receiver".to_string(),
                ))
            }
        };

        let announcer = self.announcer.downgrade();
        Ok(if self.weak {
            Subscription::weak(announcer, self.matcher, target.as_ref())
        } else {
            Subscription::strong(announcer, self.matcher, target)
        })
    }
}
