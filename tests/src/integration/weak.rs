//! # Weak Subscription Scenarios
//!
//! A weak subscription keeps firing while its target lives and disappears
//! silently once the target is dropped and a reclamation pass runs.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use announcements::{
        Action, Announcer, AnnouncerConfig, AnnouncerError, Method, SubscriptionState,
    };

    use crate::fixtures::{mock_a, AnnouncementMockA, Receiver};

    fn counter() -> (Action, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let hits = count.clone();
        let action = Action::nullary(move || {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        (action, count)
    }

    #[test]
    fn test_weak_action() {
        let announcer = Announcer::new();
        let (action, count) = counter();
        announcer
            .on(mock_a(), action.clone())
            .and_then(|s| s.make_weak())
            .expect("weak subscription");

        announcer.announce_default::<AnnouncementMockA>().expect("announce");
        assert_eq!(count.load(Ordering::SeqCst), 1);

        drop(action);
        announcer.announce_default::<AnnouncementMockA>().expect("announce");
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!announcer.has_subscriptions());
    }

    #[test]
    fn test_weak_receiver() {
        let announcer = Announcer::new();
        let receiver = Arc::new(Receiver::default());
        let observer = Arc::downgrade(&receiver);
        announcer
            .subscribe(mock_a())
            .send(Method::Unary(Receiver::receive), &receiver)
            .register()
            .and_then(|s| s.make_weak())
            .expect("weak subscription");

        announcer.announce(AnnouncementMockA::default()).expect("announce");
        assert_eq!(receiver.hits(), 1);

        drop(receiver);
        assert!(observer.upgrade().is_none());
        announcer.announce(AnnouncementMockA::default()).expect("announce");
        assert_eq!(announcer.number_of_subscriptions(), 0);
    }

    #[test]
    fn test_weak_subscription_tracks_original_receiver() {
        let announcer = Announcer::new();
        let receiver = Arc::new(Receiver::default());
        let subscription = announcer
            .subscribe(mock_a())
            .send(Method::Unary(Receiver::receive), &receiver)
            .register()
            .and_then(|s| s.make_weak())
            .expect("weak subscription");

        let held = subscription.receiver::<Receiver>().expect("receiver alive");
        assert!(Arc::ptr_eq(&held, &receiver));
        assert!(subscription.is_subscribed_by(&receiver));
    }

    #[test]
    fn test_make_weak_replaces_in_place() {
        let announcer = Announcer::new();
        let (first, _) = counter();
        let (second, _) = counter();
        let strong = announcer.on(mock_a(), first.clone()).expect("subscribe");
        let last = announcer.on(mock_a(), second).expect("subscribe");

        let weak = strong.make_weak().expect("make weak");
        assert_eq!(strong.state(), SubscriptionState::Removed);
        assert_eq!(weak.state(), SubscriptionState::Active);
        assert_eq!(announcer.registry().subscriptions(), vec![weak, last]);
    }

    #[test]
    fn test_weak_strong_round_trip() {
        let announcer = Announcer::new();
        let receiver = Arc::new(Receiver::default());
        let original = announcer
            .subscribe(mock_a())
            .send(Method::Unary(Receiver::receive), &receiver)
            .register()
            .expect("subscribe");

        let back = original
            .make_weak()
            .and_then(|weak| weak.make_strong())
            .expect("round trip");
        assert!(!back.is_weak());
        assert_eq!(back.matcher(), original.matcher());
        assert_eq!(back.subscriber(), original.subscriber());
        assert_eq!(announcer.number_of_subscriptions(), 1);

        drop(receiver);
        announcer.announce(AnnouncementMockA::default()).expect("announce");
        let held = back.receiver::<Receiver>().expect("strong keeps receiver");
        assert_eq!(held.hits(), 1);
    }

    #[test]
    fn test_make_strong_after_reclaim_fails() {
        let announcer = Announcer::new();
        let (action, _) = counter();
        let weak = announcer
            .on(mock_a(), action.clone())
            .and_then(|s| s.make_weak())
            .expect("weak subscription");

        drop(action);
        assert!(matches!(
            weak.make_strong(),
            Err(AnnouncerError::Reclaimed(_))
        ));
    }

    #[test]
    fn test_reclaim_without_delivery_pruning() {
        let config = AnnouncerConfig::default().with_reclaim_on_deliver(false);
        let announcer = Announcer::with_config(config).expect("valid config");
        let (action, count) = counter();
        let weak = announcer
            .on(mock_a(), action.clone())
            .and_then(|s| s.make_weak())
            .expect("weak subscription");

        drop(action);
        announcer.announce(AnnouncementMockA::default()).expect("announce");
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(announcer.number_of_subscriptions(), 1);
        assert!(!weak.is_alive());

        assert_eq!(announcer.reclaim(), 1);
        assert_eq!(announcer.reclaim(), 0);
        assert_eq!(weak.state(), SubscriptionState::Removed);
    }

    #[test]
    fn test_weak_subscription_registered_directly() {
        let announcer = Announcer::new();
        let receiver = Arc::new(Receiver::default());
        let subscription = announcer
            .subscribe(mock_a())
            .send(Method::Nullary(Receiver::ping), &receiver)
            .weak()
            .register()
            .expect("subscribe");
        assert!(subscription.is_weak());

        announcer.announce(AnnouncementMockA::default()).expect("announce");
        assert_eq!(receiver.hits(), 1);
    }

    #[test]
    fn test_strong_subscription_keeps_receiver_alive() {
        let announcer = Announcer::new();
        let receiver = Arc::new(Receiver::default());
        let observer = Arc::downgrade(&receiver);
        announcer
            .subscribe(mock_a())
            .send(Method::Nullary(Receiver::ping), &receiver)
            .register()
            .expect("subscribe");

        drop(receiver);
        assert!(observer.upgrade().is_some());
        announcer.reset();
        assert!(observer.upgrade().is_none());
    }
}
