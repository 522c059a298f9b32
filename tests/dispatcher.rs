//! Integration tests for the alerting pipeline

use std::{io, sync::Arc, time::Duration};

use alertgate::{
    engine::{
        AlertDispatcher, ContentFingerprint, Deduplicator, DispatchSettings, ErrorHandler,
        Fingerprint, TicketRoute,
    },
    models::Alert,
    notification::{
        TemplateService,
        email::{EmailBody, render_body},
    },
    test_helpers::{AlertBuilder, ManualClock, RecordingEmailChannel, RecordingTicketChannel},
};
use tokio::sync::Barrier;

const SUBJECT: &str = "billing-1.2.0-[prod]";

struct Pipeline {
    handler: ErrorHandler,
    dispatcher: Arc<AlertDispatcher>,
    email: Arc<RecordingEmailChannel>,
    ticket: Arc<RecordingTicketChannel>,
}

fn create_pipeline(dedup: Arc<Deduplicator>) -> Pipeline {
    let email = Arc::new(RecordingEmailChannel::new());
    let ticket = Arc::new(RecordingTicketChannel::new());
    let dispatcher = Arc::new(
        AlertDispatcher::builder()
            .settings(DispatchSettings {
                app_name: "billing".to_string(),
                email_from: "alerts@example.com".to_string(),
                email_recipients: vec!["ops@example.com".to_string()],
                email_template: None,
                ticket_message_limit: 4000,
            })
            .suppression(dedup)
            .email_channel(email.clone())
            .ticket_route(TicketRoute::new("primary", ticket.clone()))
            .build(),
    );
    let handler = ErrorHandler::new(SUBJECT, dispatcher.clone());
    Pipeline { handler, dispatcher, email, ticket }
}

fn create_default_pipeline() -> (Pipeline, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let dedup = Arc::new(Deduplicator::new(
        Arc::new(ContentFingerprint::new(Duration::from_secs(300))),
        clock.clone(),
    ));
    (create_pipeline(dedup), clock)
}

async fn drain(pipeline: &Pipeline) {
    assert!(pipeline.dispatcher.drain(Duration::from_secs(5)).await);
}

#[tokio::test]
async fn test_first_alert_is_delivered_and_repeat_suppressed() {
    let (pipeline, clock) = create_default_pipeline();
    let error = io::Error::other("disk full");

    let first = pipeline.handler.handle(&error, true);
    drain(&pipeline).await;

    assert_eq!(first.message, "disk full");
    assert_eq!(first.subject, SUBJECT);
    assert!(first.by_email);
    assert!(first.by_ticket);
    assert_eq!(first.level, 1);
    assert!(first.should_send());

    let emails = pipeline.email.sent();
    assert_eq!(emails.len(), 1);
    assert_eq!(emails[0].to, vec!["ops@example.com"]);
    assert_eq!(emails[0].subject, SUBJECT);
    assert_eq!(emails[0].body, "disk full");

    let posts = pipeline.ticket.posted();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].project, SUBJECT);
    assert_eq!(posts[0].message, "disk full");
    assert_eq!(posts[0].level, 1);

    clock.advance(Duration::from_secs(4 * 60));
    let second = pipeline.handler.handle(&error, true);
    drain(&pipeline).await;

    assert!(!second.should_send());
    assert_eq!(pipeline.email.sent().len(), 1);
    assert_eq!(pipeline.ticket.posted().len(), 1);
}

#[tokio::test]
async fn test_alert_is_delivered_again_after_window() {
    let (pipeline, clock) = create_default_pipeline();
    let error = io::Error::other("disk full");

    assert!(pipeline.handler.handle(&error, false).should_send());
    assert!(!pipeline.handler.handle(&error, false).should_send());

    clock.advance(Duration::from_secs(300));
    assert!(pipeline.handler.handle(&error, false).should_send());

    drain(&pipeline).await;
    assert_eq!(pipeline.email.sent().len(), 2);
    assert!(pipeline.ticket.posted().is_empty());
}

#[tokio::test]
async fn test_ticket_message_is_truncated_email_keeps_full_message() {
    let (pipeline, _) = create_default_pipeline();
    let message = "x".repeat(5000);

    pipeline.dispatcher.send_alert(&mut Alert::new(message.clone(), SUBJECT));
    drain(&pipeline).await;

    assert_eq!(pipeline.ticket.posted()[0].message.chars().count(), 4000);
    assert_eq!(pipeline.email.sent()[0].body, message);
}

#[tokio::test]
async fn test_alert_disabled_by_customizer_reaches_no_channel() {
    let (pipeline, _) = create_default_pipeline();

    let alert = pipeline.handler.handle_with(&io::Error::other("disk full"), |alert| {
        alert.suppress();
    });
    drain(&pipeline).await;

    assert!(!alert.should_send());
    assert!(pipeline.email.sent().is_empty());
    assert!(pipeline.ticket.posted().is_empty());

    // A disabled alert is not recorded, so the same error still gets through.
    assert!(pipeline.handler.handle(&io::Error::other("disk full"), true).should_send());
}

#[tokio::test]
async fn test_constant_fingerprint_collapses_all_alerts() {
    let policy = |_: &Alert| Fingerprint::new("everything", Duration::from_secs(60));
    let dedup = Deduplicator::new(Arc::new(policy), Arc::new(ManualClock::new()));
    let pipeline = create_pipeline(Arc::new(dedup));

    assert!(pipeline.handler.handle(&io::Error::other("disk full"), true).should_send());
    assert!(!pipeline.handler.handle(&io::Error::other("db down"), true).should_send());
    assert!(!pipeline.handler.handle(&io::Error::other("queue stuck"), false).should_send());
    drain(&pipeline).await;

    assert_eq!(pipeline.email.sent().len(), 1);
    assert_eq!(pipeline.ticket.posted().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_alerts_are_delivered_once() {
    const PRODUCERS: usize = 64;

    let (pipeline, _) = create_default_pipeline();
    let barrier = Arc::new(Barrier::new(PRODUCERS));

    let handles: Vec<_> = (0..PRODUCERS)
        .map(|_| {
            let handler = pipeline.handler.clone();
            let barrier = barrier.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                handler.handle(&io::Error::other("disk full"), true).should_send()
            })
        })
        .collect();

    let mut delivered = 0;
    for handle in handles {
        if handle.await.unwrap() {
            delivered += 1;
        }
    }
    drain(&pipeline).await;

    assert_eq!(delivered, 1);
    assert_eq!(pipeline.email.sent().len(), 1);
    assert_eq!(pipeline.ticket.posted().len(), 1);
}

#[tokio::test]
async fn test_failing_channels_do_not_affect_the_caller() {
    let email = Arc::new(RecordingEmailChannel::failing());
    let ticket = Arc::new(RecordingTicketChannel::failing());
    let dispatcher = Arc::new(
        AlertDispatcher::builder()
            .settings(DispatchSettings {
                email_recipients: vec!["ops@example.com".to_string()],
                ..Default::default()
            })
            .email_channel(email.clone())
            .ticket_route(TicketRoute::new("primary", ticket.clone()))
            .build(),
    );
    let handler = ErrorHandler::new(SUBJECT, dispatcher.clone());

    let alert = handler.handle(&io::Error::other("disk full"), true);
    assert!(dispatcher.drain(Duration::from_secs(5)).await);

    assert!(alert.should_send());
    assert_eq!(email.sent().len(), 1);
    assert_eq!(ticket.posted().len(), 1);
}

#[tokio::test]
async fn test_email_body_is_rendered_from_template() {
    let temp_dir = tempfile::tempdir().unwrap();
    let template = temp_dir.path().join("developer_email.html");
    std::fs::write(&template, "<pre>{{ msg }}</pre>").unwrap();

    let email = Arc::new(RecordingEmailChannel::new());
    let dispatcher = AlertDispatcher::builder()
        .settings(DispatchSettings {
            email_recipients: vec!["ops@example.com".to_string()],
            email_template: Some(template),
            ..Default::default()
        })
        .email_channel(email.clone())
        .build();

    dispatcher.send_alert(&mut AlertBuilder::new("disk full", SUBJECT).email_only().build());
    assert!(dispatcher.drain(Duration::from_secs(5)).await);

    let request = email.sent().remove(0);
    let body = render_body(&request, &TemplateService::new()).await;
    assert_eq!(body, EmailBody::Html("<pre>disk full</pre>".to_string()));
}

#[tokio::test]
async fn test_ticket_only_alert_routes_by_level_with_first_attachment() {
    let email = Arc::new(RecordingEmailChannel::new());
    let primary = Arc::new(RecordingTicketChannel::new());
    let escalation = Arc::new(RecordingTicketChannel::new());
    let dispatcher = AlertDispatcher::builder()
        .settings(DispatchSettings {
            email_recipients: vec!["ops@example.com".to_string()],
            ..Default::default()
        })
        .email_channel(email.clone())
        .ticket_route(TicketRoute::new("primary", primary.clone()).min_level(0))
        .ticket_route(
            TicketRoute::new("escalation", escalation.clone()).min_level(3).developer_ids(vec![7]),
        )
        .build();

    let mut minor = AlertBuilder::new("slow query", SUBJECT).level(1).ticket_only().build();
    let mut major = AlertBuilder::new("db down", SUBJECT)
        .level(3)
        .ticket_only()
        .attachment("/var/log/db.log")
        .attachment("/var/log/app.log")
        .build();
    dispatcher.send_alert(&mut minor);
    dispatcher.send_alert(&mut major);
    assert!(dispatcher.drain(Duration::from_secs(5)).await);

    assert!(email.sent().is_empty());
    assert_eq!(primary.posted().len(), 2);

    let escalated = escalation.posted();
    assert_eq!(escalated.len(), 1);
    assert_eq!(escalated[0].message, "db down");
    assert_eq!(escalated[0].developer_ids, vec![7]);
    assert_eq!(escalated[0].attachment, Some("/var/log/db.log".into()));
}
