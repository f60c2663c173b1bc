//! End-to-end dispatch scenarios over in-memory collaborators and
//! console gateways.

use std::sync::Arc;

use courier_rs::config::Settings;
use courier_rs::directory::{MemoryDirectory, SymbolicGroup};
use courier_rs::render::MapTemplates;
use courier_rs::store::{MemoryStore, NotificationStore};
use courier_rs::{AppError, Channel, Notifier, NotifyRequest, Recipient};

fn settings(channels_toml: &str) -> Settings {
    let mut settings = Settings::default();
    settings.notifier.channels = toml::from_str(channels_toml).unwrap();
    settings
}

fn notifier(settings: Settings, users: Vec<Recipient>, templates: MapTemplates) -> Notifier {
    Notifier::new(
        settings,
        Arc::new(MemoryDirectory::new(users)),
        Arc::new(templates),
        Arc::new(MemoryStore::new()),
    )
}

const CONSOLE_EMAIL: &str = r#"
    [email]
    default_gateway = "console"

    [email.gateways.console]
    client = "console"
    from = "noreply@example.com"
"#;

const CONSOLE_SMS: &str = r#"
    [sms]
    default_gateway = "console"

    [sms.gateways.console]
    client = "console"
"#;

#[tokio::test]
async fn email_goes_to_every_receiver_with_an_address() {
    let receivers = vec![
        Recipient::new("alice").with_email("alice@example.com"),
        Recipient::new("bob").with_email("bob@example.com"),
        Recipient::new("carol"),
    ];
    let notifier = notifier(settings(CONSOLE_EMAIL), vec![], MapTemplates::new());

    let request = NotifyRequest::new(vec![Channel::Email], "Hello")
        .final_message("Hi there")
        .to(receivers);
    let results = notifier.notify(request).await.unwrap().join().await;

    let report = results[0].1.as_ref().unwrap();
    assert_eq!(report.attempted, 2);
    assert_eq!(report.delivered, 2);
    assert_eq!(report.skipped, 1);
    assert!(report.failures.is_empty());
}

#[tokio::test]
async fn email_falls_back_to_next_gateway_on_transport_failure() {
    // The broken gateway points at a closed local port; the connection is
    // refused and the whole receiver set retries through the backup.
    let channels = r#"
        [email]
        default_gateway = "broken"
        fallbacks = ["backup"]

        [email.gateways.broken]
        client = "smtp"
        host = "127.0.0.1"
        port = 1
        from = "noreply@example.com"

        [email.gateways.backup]
        client = "console"
        from = "backup@example.com"
    "#;
    let notifier = notifier(settings(channels), vec![], MapTemplates::new());

    let request = NotifyRequest::new(vec![Channel::Email], "Hello")
        .final_message("Hi there")
        .to(vec![Recipient::new("alice").with_email("alice@example.com")]);
    let results = notifier.notify(request).await.unwrap().join().await;

    let report = results[0].1.as_ref().unwrap();
    assert_eq!(report.gateway, "backup");
    assert_eq!(report.tried_gateways, ["broken"]);
    assert_eq!(report.delivered, 1);
    assert!(report.is_complete());
}

#[tokio::test]
async fn exhausted_fallback_chain_never_retries_a_gateway() {
    // The chain lists the default gateway again; after both gateways fail
    // the loop must stop instead of running the default a second time.
    let channels = r#"
        [email]
        default_gateway = "broken"
        fallbacks = ["broken2", "broken"]

        [email.gateways.broken]
        client = "smtp"
        host = "127.0.0.1"
        port = 1
        from = "noreply@example.com"

        [email.gateways.broken2]
        client = "smtp"
        host = "127.0.0.1"
        port = 1
        from = "noreply@example.com"
    "#;
    let notifier = notifier(settings(channels), vec![], MapTemplates::new());

    let request = NotifyRequest::new(vec![Channel::Email], "Hello")
        .final_message("Hi there")
        .to(vec![Recipient::new("alice").with_email("alice@example.com")]);
    let results = notifier.notify(request).await.unwrap().join().await;

    let report = results[0].1.as_ref().unwrap();
    assert_eq!(report.gateway, "broken2");
    assert_eq!(report.tried_gateways, ["broken"]);
    assert!(!report.tried_gateways.contains(&report.gateway));
    assert_eq!(report.delivered, 0);
    assert!(!report.failures.is_empty());
}

#[tokio::test]
async fn missing_template_does_not_walk_the_fallback_chain() {
    let channels = r#"
        [email]
        default_gateway = "primary"
        fallbacks = ["backup"]

        [email.gateways.primary]
        client = "console"
        from = "a@example.com"

        [email.gateways.backup]
        client = "console"
        from = "b@example.com"
    "#;
    let notifier = notifier(settings(channels), vec![], MapTemplates::new());

    let request = NotifyRequest::new(vec![Channel::Email], "Hello")
        .template("ghost")
        .to(vec![Recipient::new("alice").with_email("alice@example.com")]);
    let results = notifier.notify(request).await.unwrap().join().await;

    let report = results[0].1.as_ref().unwrap();
    assert_eq!(report.gateway, "primary");
    assert!(report.tried_gateways.is_empty());
    assert_eq!(report.delivered, 0);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.contains("ghost"));
}

#[tokio::test]
async fn gateway_override_beats_the_default() {
    let channels = r#"
        [email]
        default_gateway = "primary"

        [email.gateways.primary]
        client = "console"
        from = "a@example.com"

        [email.gateways.secondary]
        client = "console"
        from = "b@example.com"
    "#;
    let notifier = notifier(settings(channels), vec![], MapTemplates::new());

    let request = NotifyRequest::new(vec![Channel::Email], "Hello")
        .final_message("Hi")
        .gateway(Channel::Email, "secondary")
        .to(vec![Recipient::new("alice").with_email("alice@example.com")]);
    let results = notifier.notify(request).await.unwrap().join().await;

    assert_eq!(results[0].1.as_ref().unwrap().gateway, "secondary");
}

#[tokio::test]
async fn push_persists_one_record_per_receiver() {
    let channels = r#"
        [push]
        default_gateway = "console"

        [push.gateways.console]
        client = "console"
    "#;
    let mut templates = MapTemplates::new();
    templates.insert(
        "welcome/push.json",
        r#"{
            "text": "Welcome {{ user.username }}",
            "type": "account",
            "sub_type": "welcome",
            "link": "/home",
            "mode": "user",
            "data": {},
            "actions": []
        }"#,
    );

    let store = Arc::new(MemoryStore::new());
    let notifier = Notifier::new(
        settings(channels),
        Arc::new(MemoryDirectory::default()),
        Arc::new(templates),
        store.clone(),
    );

    let request = NotifyRequest::new(vec![Channel::Push], "Welcome")
        .template("welcome")
        .to(vec![
            Recipient::new("alice").with_push_token("ExponentPushToken[a]"),
            Recipient::new("bob").with_push_token("ExponentPushToken[b]"),
        ]);
    let results = notifier.notify(request).await.unwrap().join().await;

    let report = results[0].1.as_ref().unwrap();
    assert_eq!(report.delivered, 2);
    assert_eq!(report.notifications.len(), 2);

    let saved = store.list_for_user("alice").await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].subject, "Welcome");
    assert_eq!(saved[0].text, "Welcome alice");
    assert_eq!(saved[0].kind, "account");
    assert_eq!(saved[0].sub_type.as_deref(), Some("welcome"));
    assert_eq!(saved[0].link.as_deref(), Some("/home"));
    assert!(saved[0].actions.is_empty());
    assert!(saved[0].read.is_none());
    assert!(saved[0].sent <= jiff::Timestamp::now());
}

#[tokio::test]
async fn admins_group_reaches_only_superusers() {
    let users = vec![
        Recipient::new("root")
            .with_email("root@example.com")
            .staff()
            .superuser(),
        Recipient::new("staffer").with_email("staffer@example.com").staff(),
        Recipient::new("plain").with_email("plain@example.com"),
    ];
    let notifier = notifier(settings(CONSOLE_EMAIL), users, MapTemplates::new());

    let request = NotifyRequest::new(vec![Channel::Email], "S")
        .final_message("Hi")
        .to(SymbolicGroup::Admins);
    let results = notifier.notify(request).await.unwrap().join().await;

    let report = results[0].1.as_ref().unwrap();
    assert_eq!(report.attempted, 1);
    assert_eq!(report.delivered, 1);
}

#[tokio::test]
async fn telegram_degrades_to_the_sms_template() {
    let channels = r#"
        [telegram]
        default_gateway = "console"

        [telegram.gateways.console]
        client = "console"
    "#;
    let mut templates = MapTemplates::new();
    templates.insert("reset/sms.txt", "Your code: {{ code }}");

    let users = vec![
        Recipient::new("alice").with_telegram_chat_id(1001),
        Recipient::new("bob"),
    ];
    let notifier = notifier(settings(channels), vec![], templates);

    let mut context = serde_json::Map::new();
    context.insert("code".to_string(), serde_json::json!("4242"));
    let request = NotifyRequest::new(vec![Channel::Telegram], "Reset")
        .template("reset")
        .context(context)
        .to(users);
    let results = notifier.notify(request).await.unwrap().join().await;

    let report = results[0].1.as_ref().unwrap();
    assert_eq!(report.delivered, 1);
    assert_eq!(report.skipped, 1);
}

#[tokio::test]
async fn one_channel_failing_does_not_abort_the_others() {
    // sms is not configured; email still delivers.
    let notifier = notifier(settings(CONSOLE_EMAIL), vec![], MapTemplates::new());

    let request = NotifyRequest::new(vec![Channel::Sms, Channel::Email], "Hello")
        .final_message("Hi")
        .to(vec![Recipient::new("alice")
            .with_email("alice@example.com")
            .with_phone("+237600000001")]);
    let results = notifier.notify(request).await.unwrap().join().await;

    assert!(matches!(results[0].1, Err(AppError::Configuration { .. })));
    assert_eq!(results[1].1.as_ref().unwrap().delivered, 1);
}

#[tokio::test]
async fn symbolic_complement_group_targets_non_staff() {
    let users = vec![
        Recipient::new("staffer").with_phone("+1").staff(),
        Recipient::new("plain_a").with_phone("+2"),
        Recipient::new("plain_b").with_phone("+3"),
    ];
    let notifier = notifier(settings(CONSOLE_SMS), users, MapTemplates::new());

    let request = NotifyRequest::new(vec![Channel::Sms], "Notice")
        .final_message("Hi")
        .to(SymbolicGroup::AllStaff);
    let results = notifier.notify(request).await.unwrap().join().await;

    assert_eq!(results[0].1.as_ref().unwrap().attempted, 2);
}

#[tokio::test]
async fn invalid_request_fails_before_any_dispatch() {
    let notifier = notifier(settings(CONSOLE_EMAIL), vec![], MapTemplates::new());

    let request = NotifyRequest::new(vec![Channel::Email], "Hello")
        .to(vec![Recipient::new("alice").with_email("alice@example.com")]);
    let err = notifier.notify(request).await.unwrap_err();
    assert!(matches!(err, AppError::Validation { .. }));
}
