use rsvp_domain::config::{
    AdminsConfig, ApiConfig, DispatchConfig, LoggingConfig, ServerConfig, TelegramConfig,
};
use rsvp_domain::constants::strip_marker;
use rsvp_domain::notify::ChannelId;
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let server = ServerConfig::default();
    assert_eq!(server.port, 8080);
    assert!(server.ssl.is_none());
    assert!(server.cors_allow_any);

    let telegram = TelegramConfig::default();
    assert!(telegram.enabled);
    assert!(!telegram.has_token());
    assert_eq!(telegram.api_url, "https://api.telegram.org");
    assert_eq!(telegram.poll_timeout_secs, 10);

    let dispatch = DispatchConfig::default();
    assert_eq!(dispatch.concurrency, 1);
    assert_eq!(dispatch.send_timeout_ms, 10_000);

    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.directory.is_none());
}

#[test]
fn api_config_deserializes() {
    let raw = json!({
        "server": { "address": "::", "port": 443, "ssl": { "cert": "c.pem", "key": "k.pem" } },
        "telegram": { "token": "123:abc", "poll_timeout_secs": 25 },
        "admins": { "usernames": "@Alice, bob", "chat_ids": "42" },
        "dispatch": { "concurrency": 4 }
    });

    let cfg: ApiConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.server.port, 443);
    assert_eq!(
        cfg.server.ssl.as_ref().map(|ssl| ssl.key.clone()),
        Some(std::path::PathBuf::from("k.pem"))
    );
    assert!(cfg.telegram.has_token());
    assert_eq!(cfg.telegram.poll_timeout_secs, 25);
    assert_eq!(cfg.telegram.request_timeout_secs, 30, "unset keys keep their defaults");
    assert_eq!(cfg.admins.allow_list(), vec!["Alice".to_owned(), "bob".to_owned()]);
    assert_eq!(cfg.dispatch.concurrency, 4);
    assert_eq!(cfg.dispatch.send_timeout_ms, 10_000);
}

#[test]
fn allow_list_drops_markers_and_blanks() {
    let admins = AdminsConfig { usernames: " @alice ,, @ ,Bob,".to_owned(), chat_ids: String::new() };
    assert_eq!(admins.allow_list(), vec!["alice".to_owned(), "Bob".to_owned()]);

    assert!(AdminsConfig::default().allow_list().is_empty());
}

#[test]
fn allow_list_keeps_a_doubled_marker() {
    let admins = AdminsConfig { usernames: "@@alice".to_owned(), chat_ids: String::new() };
    assert_eq!(admins.allow_list(), vec!["@alice".to_owned()]);
    assert_eq!(admins.entries().collect::<Vec<_>>(), ["@@alice"]);
    assert_eq!(strip_marker("@@alice"), "@alice");
    assert_eq!(strip_marker("alice"), "alice");
}

#[test]
fn seeded_chat_ids_skip_malformed_entries() {
    let admins = AdminsConfig {
        usernames: String::new(),
        chat_ids: "12, -100500, abc, , 7x, 99".to_owned(),
    };
    assert_eq!(admins.seeded_chat_ids(), vec![ChannelId(12), ChannelId(-100_500), ChannelId(99)]);
}
