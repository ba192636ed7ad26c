//! # Spy Scenarios
//!
//! The spy watching the demo scenario, and alongside ordinary subscribers.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use announcement_spy::{AnnouncementSpy, SpyRecord};
    use announcements::{Announcer, AnnouncerConfig, Method};

    use crate::fixtures::{mock_b, AnnouncementMockA, AnnouncementMockC, Receiver};

    #[test]
    fn test_spy_sees_demo_scenario() {
        let config = AnnouncerConfig::default().with_name("demo");
        let announcer = Announcer::with_config(config).expect("valid config");
        let spy = AnnouncementSpy::attach(&announcer).expect("attach");

        let report = announcement_demo::run(&announcer).expect("scenario");
        assert_eq!(report.clicks, 3);
        // The spy is the other surviving subscription.
        assert_eq!(report.remaining_subscriptions, 2);

        let names: Vec<_> = spy
            .announcements()
            .into_iter()
            .map(|record| record.announcement)
            .collect();
        assert_eq!(
            names,
            vec![
                "Clicked",
                "Clicked",
                "Clicked",
                "Clicked",
                "Hovered",
                "KeyPressed",
                "DoubleClicked"
            ]
        );
        assert!(spy
            .announcements()
            .iter()
            .all(|record| record.announcer == "demo"));
    }

    #[test]
    fn test_spy_alongside_subscribers() {
        let announcer = Announcer::new();
        let receiver = Arc::new(Receiver::default());
        announcer
            .subscribe(mock_b())
            .send(Method::Unary(Receiver::receive), &receiver)
            .register()
            .expect("subscribe");
        let spy = AnnouncementSpy::attach(&announcer).expect("attach");

        announcer.announce(AnnouncementMockA { value: 1 }).expect("announce");
        announcer.announce(AnnouncementMockC).expect("announce");

        assert_eq!(receiver.seen(), vec!["AnnouncementMockC"]);
        assert_eq!(
            spy.announcements(),
            vec![
                SpyRecord {
                    announcer: "announcer".to_string(),
                    announcement: "AnnouncementMockA".to_string(),
                    detail: "AnnouncementMockA { value: 1 }".to_string(),
                },
                SpyRecord {
                    announcer: "announcer".to_string(),
                    announcement: "AnnouncementMockC".to_string(),
                    detail: "AnnouncementMockC".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_unsubscribe_spy() {
        let announcer = Announcer::new();
        let spy = AnnouncementSpy::attach(&announcer).expect("attach");
        assert_eq!(announcer.unsubscribe(&spy), 1);

        announcer.announce(AnnouncementMockC).expect("announce");
        assert_eq!(spy.index(), 0);
    }

    #[test]
    fn test_spy_log_exports_as_json() {
        let announcer = Announcer::new();
        let spy = AnnouncementSpy::attach(&announcer).expect("attach");
        announcer.announce(AnnouncementMockC).expect("announce");

        let json: serde_json::Value =
            serde_json::from_str(&spy.to_json().expect("json")).expect("valid json");
        assert_eq!(json[0]["announcement"], "AnnouncementMockC");
        assert_eq!(json[0]["announcer"], "announcer");
    }
}
