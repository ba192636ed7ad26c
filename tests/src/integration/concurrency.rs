//! # Concurrency Scenarios
//!
//! One announcer shared by many threads: subscriptions added, removed and
//! announced to concurrently.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use announcements::{Action, Announcer, Method};

    use crate::fixtures::{mock_a, mock_b, AnnouncementMockA, AnnouncementMockB, Receiver};

    const THREADS: usize = 8;
    const PER_THREAD: usize = 50;

    #[test]
    fn test_concurrent_subscribe_counts_every_subscription() {
        let announcer = Announcer::new();
        thread::scope(|scope| {
            for _ in 0..THREADS {
                scope.spawn(|| {
                    for _ in 0..PER_THREAD {
                        announcer
                            .on(mock_a(), Action::nullary(|| Ok(())))
                            .expect("subscribe");
                    }
                });
            }
        });
        assert_eq!(announcer.number_of_subscriptions(), THREADS * PER_THREAD);
    }

    #[test]
    fn test_concurrent_announce_delivers_every_announcement() {
        let announcer = Announcer::new();
        let count = Arc::new(AtomicUsize::new(0));
        let hits = count.clone();
        announcer
            .on(
                mock_a(),
                Action::nullary(move || {
                    hits.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .expect("subscribe");

        thread::scope(|scope| {
            for _ in 0..THREADS {
                scope.spawn(|| {
                    for _ in 0..PER_THREAD {
                        announcer
                            .announce(AnnouncementMockA::default())
                            .expect("announce");
                    }
                });
            }
        });
        assert_eq!(count.load(Ordering::SeqCst), THREADS * PER_THREAD);
    }

    #[test]
    fn test_unsubscribe_while_announcing() {
        let announcer = Announcer::new();
        let receivers: Vec<_> = (0..THREADS).map(|_| Arc::new(Receiver::default())).collect();
        for receiver in &receivers {
            announcer
                .subscribe(mock_b())
                .send(Method::Nullary(Receiver::ping), receiver)
                .register()
                .expect("subscribe");
        }

        thread::scope(|scope| {
            scope.spawn(|| {
                for _ in 0..PER_THREAD {
                    announcer.announce(AnnouncementMockB).expect("announce");
                }
            });
            for receiver in &receivers {
                let announcer = &announcer;
                scope.spawn(move || {
                    announcer.unsubscribe(receiver);
                });
            }
        });

        assert!(!announcer.has_subscriptions());
        assert!(receivers.iter().all(|r| r.hits() <= PER_THREAD));
    }

    #[test]
    fn test_weak_targets_dropped_on_other_threads_are_reclaimed() {
        let announcer = Announcer::new();
        let receivers: Vec<_> = (0..THREADS).map(|_| Arc::new(Receiver::default())).collect();
        for receiver in &receivers {
            announcer
                .subscribe(mock_a())
                .send(Method::Nullary(Receiver::ping), receiver)
                .weak()
                .register()
                .expect("subscribe");
        }

        thread::scope(|scope| {
            for receiver in receivers {
                scope.spawn(move || drop(receiver));
            }
        });

        announcer.announce(AnnouncementMockA::default()).expect("announce");
        assert_eq!(announcer.number_of_subscriptions(), 0);
        assert_eq!(announcer.reclaim(), 0);
    }
}
