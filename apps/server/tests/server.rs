use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use parking_lot::Mutex;
use rsvp_domain::config::{ApiConfig, SslConfig};
use rsvp_domain::notify::Recipient;
use rsvp_notify::{Messenger, Notifier, SendFuture};
use rsvp_server::Server;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Debug, Default)]
struct InboxMessenger {
    inbox: Mutex<Vec<(String, String)>>,
}

impl Messenger for InboxMessenger {
    fn send<'a>(&'a self, recipient: &'a Recipient, text: &'a str) -> SendFuture<'a> {
        Box::pin(async move {
            self.inbox.lock().push((recipient.to_string(), text.to_owned()));
            Ok(())
        })
    }
}

fn config() -> ApiConfig {
    let mut cfg = ApiConfig::default();
    cfg.admins.usernames = "@alice, bob".to_owned();
    cfg.admins.chat_ids = "100".to_owned();
    cfg
}

async fn server(messenger: Arc<InboxMessenger>) -> Server {
    Server::builder().config(config()).messenger(messenger).build().await.unwrap()
}

#[tokio::test]
async fn health_is_served() {
    let server = server(Arc::default()).await;

    let response = server
        .router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "up");
}

#[tokio::test]
async fn guest_reply_reaches_seeded_admin() {
    let messenger = Arc::new(InboxMessenger::default());
    let server = server(messenger.clone()).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "fio": "Anna Smirnova", "telephone": "+79001112233", "transport": "transfer" })
                .to_string(),
        ))
        .unwrap();
    let response = server.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let inbox = messenger.inbox.lock();
    assert_eq!(inbox.len(), 1);
    assert!(inbox[0].1.contains("Anna Smirnova"));
}

#[tokio::test]
async fn cors_preflight_allows_any_origin() {
    let server = server(Arc::default()).await;

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/")
        .header(header::ORIGIN, "https://invite.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = server.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn api_reference_is_mounted() {
    let server = server(Arc::default()).await;

    let response = server
        .router()
        .oneshot(Request::builder().uri("/api").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn notifier_slice_is_registered() {
    let server = server(Arc::default()).await;

    let notifier = server.state().try_get_slice::<Notifier>().unwrap();
    assert_eq!(notifier.registry().len(), 1);
    assert_eq!(server.state().slice_names().collect::<Vec<_>>(), ["notify"]);
}

#[tokio::test]
async fn enabled_bot_without_token_is_refused() {
    let err = Server::builder().config(config()).build().await.unwrap_err();
    assert!(format!("{err:#}").contains("telegram.token"));
}

#[tokio::test]
async fn empty_allow_list_is_refused() {
    let err = Server::builder()
        .messenger(Arc::new(InboxMessenger::default()))
        .build()
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("admins.usernames"));
}

#[tokio::test]
async fn bot_client_is_built_from_token() {
    let mut cfg = config();
    cfg.telegram.token = "123:abc".to_owned();

    let server = Server::builder().config(cfg).build().await.unwrap();
    assert!(server.state().try_get_slice::<Notifier>().is_ok());
}

#[tokio::test]
async fn missing_certificate_is_refused() {
    let mut cfg = config();
    cfg.server.ssl = Some(SslConfig {
        cert: PathBuf::from("/nonexistent/rsvp.crt"),
        key: PathBuf::from("/nonexistent/rsvp.key"),
    });

    let err = Server::builder()
        .config(cfg)
        .messenger(Arc::new(InboxMessenger::default()))
        .build()
        .await
        .unwrap_err();
    assert!(err.to_string().contains("SSL certificate not found"));
}
