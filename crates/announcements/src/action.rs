//! # Actions
//!
//! What a subscription runs when a matching announcement is delivered.
//!
//! The calling convention is resolved when the action is built, not on every
//! delivery:
//!
//! | Shape      | Receives                         |
//! |------------|----------------------------------|
//! | `Nullary`  | nothing                          |
//! | `Unary`    | the announcement                 |
//! | `Binary`   | the announcement and the announcer |
//! | `Declared` | whatever its declared arity asks for |
//!
//! `Declared` exists for dynamically shaped callables (script bridges,
//! adapters) whose arity is only known at runtime. An arity outside `0..=2`
//! fails at delivery with `IncompatibleSignature`.
//!
//! A [`Method`] is the receiver-bound counterpart: a plain function taking the
//! receiver as its first parameter. The receiver is not counted in the arity
//! and is owned by the subscription, not captured by the function, which is
//! what lets a weak subscription track the receiver alone.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::announcement::Announcement;
use crate::announcer::Announcer;
use crate::error::AnnouncerError;
use crate::subscription::SubscriptionId;

/// Outcome of a subscriber action.
pub type ActionResult = anyhow::Result<()>;

type NullaryFn = dyn Fn() -> ActionResult + Send + Sync;
type UnaryFn = dyn Fn(&dyn Announcement) -> ActionResult + Send + Sync;
type BinaryFn = dyn Fn(&dyn Announcement, &Announcer) -> ActionResult + Send + Sync;
type DeclaredFn = dyn Fn(&[Argument<'_>]) -> ActionResult + Send + Sync;

/// An argument handed to a [`Action::Declared`] callable.
#[derive(Clone, Copy)]
pub enum Argument<'a> {
    Announcement(&'a dyn Announcement),
    Announcer(&'a Announcer),
}

impl<'a> Argument<'a> {
    pub fn as_announcement(&self) -> Option<&'a dyn Announcement> {
        match self {
            Self::Announcement(announcement) => Some(*announcement),
            Self::Announcer(_) => None,
        }
    }

    pub fn as_announcer(&self) -> Option<&'a Announcer> {
        match self {
            Self::Announcer(announcer) => Some(*announcer),
            Self::Announcement(_) => None,
        }
    }
}

/// A free-standing subscriber callable.
///
/// Cloning shares the callable; the shared allocation is the action's
/// identity when it is used as its own subscriber.
#[derive(Clone)]
pub enum Action {
    Nullary(Arc<NullaryFn>),
    Unary(Arc<UnaryFn>),
    Binary(Arc<BinaryFn>),
    Declared { arity: usize, call: Arc<DeclaredFn> },
}

impl Action {
    /// An action that ignores the announcement.
    pub fn nullary(f: impl Fn() -> ActionResult + Send + Sync + 'static) -> Self {
        Self::Nullary(Arc::new(f))
    }

    /// An action receiving the announcement.
    pub fn unary(f: impl Fn(&dyn Announcement) -> ActionResult + Send + Sync + 'static) -> Self {
        Self::Unary(Arc::new(f))
    }

    /// An action receiving the announcement and the announcer delivering it.
    pub fn binary(
        f: impl Fn(&dyn Announcement, &Announcer) -> ActionResult + Send + Sync + 'static,
    ) -> Self {
        Self::Binary(Arc::new(f))
    }

    /// An action whose arity is only known at runtime.
    pub fn with_arity(
        arity: usize,
        f: impl Fn(&[Argument<'_>]) -> ActionResult + Send + Sync + 'static,
    ) -> Self {
        Self::Declared {
            arity,
            call: Arc::new(f),
        }
    }

    /// Number of arguments the action expects.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            Self::Nullary(_) => 0,
            Self::Unary(_) => 1,
            Self::Binary(_) => 2,
            Self::Declared { arity, .. } => *arity,
        }
    }

    /// Identity of this action when it acts as its own subscriber.
    #[must_use]
    pub fn subscriber_id(&self) -> SubscriberId {
        match self {
            Self::Nullary(f) => SubscriberId::of(f),
            Self::Unary(f) => SubscriberId::of(f),
            Self::Binary(f) => SubscriberId::of(f),
            Self::Declared { call, .. } => SubscriberId::of(call),
        }
    }

    /// A non-owning handle to the same callable.
    #[must_use]
    pub fn downgrade(&self) -> WeakAction {
        match self {
            Self::Nullary(f) => WeakAction::Nullary(Arc::downgrade(f)),
            Self::Unary(f) => WeakAction::Unary(Arc::downgrade(f)),
            Self::Binary(f) => WeakAction::Binary(Arc::downgrade(f)),
            Self::Declared { arity, call } => WeakAction::Declared {
                arity: *arity,
                call: Arc::downgrade(call),
            },
        }
    }

    fn call(
        &self,
        subscription: SubscriptionId,
        announcement: &dyn Announcement,
        announcer: Option<&Announcer>,
    ) -> Result<(), AnnouncerError> {
        let outcome = match self {
            Self::Nullary(f) => f(),
            Self::Unary(f) => f(announcement),
            Self::Binary(f) => f(announcement, require(subscription, announcer)?),
            Self::Declared { arity, call } => match *arity {
                0 => call(&[]),
                1 => call(&[Argument::Announcement(announcement)]),
                2 => call(&[
                    Argument::Announcement(announcement),
                    Argument::Announcer(require(subscription, announcer)?),
                ]),
                other => {
                    return Err(AnnouncerError::IncompatibleSignature {
                        subscription,
                        arity: other,
                    })
                }
            },
        };
        outcome.map_err(|source| AnnouncerError::ActionFailed {
            subscription,
            source,
        })
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("arity", &self.arity())
            .field("subscriber", &self.subscriber_id())
            .finish()
    }
}

impl From<&Action> for SubscriberId {
    fn from(action: &Action) -> Self {
        action.subscriber_id()
    }
}

/// Non-owning counterpart of [`Action`].
#[derive(Clone)]
pub enum WeakAction {
    Nullary(Weak<NullaryFn>),
    Unary(Weak<UnaryFn>),
    Binary(Weak<BinaryFn>),
    Declared { arity: usize, call: Weak<DeclaredFn> },
}

impl WeakAction {
    /// The action, if it is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<Action> {
        Some(match self {
            Self::Nullary(f) => Action::Nullary(f.upgrade()?),
            Self::Unary(f) => Action::Unary(f.upgrade()?),
            Self::Binary(f) => Action::Binary(f.upgrade()?),
            Self::Declared { arity, call } => Action::Declared {
                arity: *arity,
                call: call.upgrade()?,
            },
        })
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        let strong = match self {
            Self::Nullary(f) => f.strong_count(),
            Self::Unary(f) => f.strong_count(),
            Self::Binary(f) => f.strong_count(),
            Self::Declared { call, .. } => call.strong_count(),
        };
        strong > 0
    }
}

/// A function bound to a receiver of type `R`.
///
/// Any `fn(&R, ...)` method with a matching signature coerces into the
/// variant, e.g. `Method::Unary(Logger::record)`.
pub enum Method<R> {
    Nullary(fn(&R) -> ActionResult),
    Unary(fn(&R, &dyn Announcement) -> ActionResult),
    Binary(fn(&R, &dyn Announcement, &Announcer) -> ActionResult),
}

impl<R> Method<R> {
    /// Number of arguments, the receiver excluded.
    #[must_use]
    pub fn arity(&self) -> usize {
        match self {
            Self::Nullary(_) => 0,
            Self::Unary(_) => 1,
            Self::Binary(_) => 2,
        }
    }

    fn call(
        &self,
        receiver: &R,
        subscription: SubscriptionId,
        announcement: &dyn Announcement,
        announcer: Option<&Announcer>,
    ) -> Result<(), AnnouncerError> {
        let outcome = match self {
            Self::Nullary(f) => f(receiver),
            Self::Unary(f) => f(receiver, announcement),
            Self::Binary(f) => f(receiver, announcement, require(subscription, announcer)?),
        };
        outcome.map_err(|source| AnnouncerError::ActionFailed {
            subscription,
            source,
        })
    }
}

impl<R> Clone for Method<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Method<R> {}

impl<R> fmt::Debug for Method<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method").field("arity", &self.arity()).finish()
    }
}

fn require(
    subscription: SubscriptionId,
    announcer: Option<&Announcer>,
) -> Result<&Announcer, AnnouncerError> {
    announcer.ok_or(AnnouncerError::Detached(subscription))
}

/// Identity a subscription is grouped and removed by.
///
/// Derived from the address of the shared allocation of the subscriber, so
/// it is stable for as long as anything keeps that allocation alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

impl SubscriberId {
    /// Identity of a shared subscriber.
    #[must_use]
    pub fn of<T: ?Sized>(target: &Arc<T>) -> Self {
        Self(Arc::as_ptr(target) as *const () as usize)
    }
}

impl<T: ?Sized> From<&Arc<T>> for SubscriberId {
    fn from(target: &Arc<T>) -> Self {
        Self::of(target)
    }
}

// ---------------------------------------------------------------------------
// Type-erased targets held by subscriptions
// ---------------------------------------------------------------------------

/// A live callable plus whatever it is bound to.
pub(crate) trait Target: Send + Sync {
    fn arity(&self) -> usize;

    fn subscriber(&self) -> SubscriberId;

    fn receiver(&self) -> Option<Arc<dyn Any + Send + Sync>>;

    fn invoke(
        &self,
        subscription: SubscriptionId,
        announcement: &dyn Announcement,
        announcer: Option<&Announcer>,
    ) -> Result<(), AnnouncerError>;

    fn downgrade(&self) -> Box<dyn WeakTarget>;
}

/// The non-owning form of a [`Target`].
pub(crate) trait WeakTarget: Send + Sync {
    fn upgrade(&self) -> Option<Box<dyn Target>>;

    fn is_alive(&self) -> bool;
}

impl Target for Action {
    fn arity(&self) -> usize {
        Action::arity(self)
    }

    fn subscriber(&self) -> SubscriberId {
        self.subscriber_id()
    }

    fn receiver(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        None
    }

    fn invoke(
        &self,
        subscription: SubscriptionId,
        announcement: &dyn Announcement,
        announcer: Option<&Announcer>,
    ) -> Result<(), AnnouncerError> {
        self.call(subscription, announcement, announcer)
    }

    fn downgrade(&self) -> Box<dyn WeakTarget> {
        Box::new(Action::downgrade(self))
    }
}

impl WeakTarget for WeakAction {
    fn upgrade(&self) -> Option<Box<dyn Target>> {
        WeakAction::upgrade(self).map(|action| Box::new(action) as Box<dyn Target>)
    }

    fn is_alive(&self) -> bool {
        WeakAction::is_alive(self)
    }
}

pub(crate) struct BoundMethod<R> {
    receiver: Arc<R>,
    method: Method<R>,
}

impl<R> BoundMethod<R> {
    pub(crate) fn new(receiver: Arc<R>, method: Method<R>) -> Self {
        Self { receiver, method }
    }
}

impl<R: Send + Sync + 'static> Target for BoundMethod<R> {
    fn arity(&self) -> usize {
        self.method.arity()
    }

    fn subscriber(&self) -> SubscriberId {
        SubscriberId::of(&self.receiver)
    }

    fn receiver(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        Some(self.receiver.clone())
    }

    fn invoke(
        &self,
        subscription: SubscriptionId,
        announcement: &dyn Announcement,
        announcer: Option<&Announcer>,
    ) -> Result<(), AnnouncerError> {
        self.method
            .call(&self.receiver, subscription, announcement, announcer)
    }

    fn downgrade(&self) -> Box<dyn WeakTarget> {
        Box::new(WeakBoundMethod {
            receiver: Arc::downgrade(&self.receiver),
            method: self.method,
        })
    }
}

struct WeakBoundMethod<R> {
    receiver: Weak<R>,
    method: Method<R>,
}

impl<R: Send + Sync + 'static> WeakTarget for WeakBoundMethod<R> {
    fn upgrade(&self) -> Option<Box<dyn Target>> {
        let receiver = self.receiver.upgrade()?;
        Some(Box::new(BoundMethod::new(receiver, self.method)))
    }

    fn is_alive(&self) -> bool {
        self.receiver.strong_count() > 0
    }
}
