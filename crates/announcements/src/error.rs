//! Error types for the announcement dispatcher

use thiserror::Error;

use crate::subscription::{SubscriptionId, SubscriptionState};

/// Errors raised by announcers, registries and subscriptions.
#[derive(Debug, Error)]
pub enum AnnouncerError {
    /// Subscribe was called with both an action and a method, or with neither.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The action declares a number of parameters the dispatcher cannot supply.
    #[error("Incompatible signature for subscription {subscription}: action takes {arity} arguments, expected 0, 1 or 2")]
    IncompatibleSignature {
        subscription: SubscriptionId,
        arity: usize,
    },

    /// Replace was asked to swap out a subscription that is not registered.
    #[error("Subscription not found: {0}")]
    NotFound(SubscriptionId),

    /// A subscriber action returned an error during delivery.
    #[error("Action of subscription {subscription} failed: {source}")]
    ActionFailed {
        subscription: SubscriptionId,
        #[source]
        source: anyhow::Error,
    },

    /// Only pending subscriptions can be registered.
    #[error("Subscription {subscription} cannot be registered while {state}")]
    InvalidState {
        subscription: SubscriptionId,
        state: SubscriptionState,
    },

    /// The announcer owning the subscription no longer exists.
    #[error("Subscription {0} is detached from its announcer")]
    Detached(SubscriptionId),

    /// The weak target of the subscription has already been dropped.
    #[error("Subscription {0} lost its subscriber")]
    Reclaimed(SubscriptionId),
}

impl AnnouncerError {
    /// Returns `true` for errors produced while invoking a subscriber.
    #[must_use]
    pub fn is_delivery_failure(&self) -> bool {
        matches!(
            self,
            Self::IncompatibleSignature { .. } | Self::ActionFailed { .. }
        )
    }

    /// The subscription involved, when there is one.
    #[must_use]
    pub fn subscription(&self) -> Option<SubscriptionId> {
        match self {
            Self::Configuration(_) => None,
            Self::IncompatibleSignature { subscription, .. }
            | Self::ActionFailed { subscription, .. }
            | Self::InvalidState { subscription, .. } => Some(*subscription),
            Self::NotFound(id) | Self::Detached(id) | Self::Reclaimed(id) => Some(*id),
        }
    }
}
