use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use parking_lot::Mutex;
use rsvp_domain::config::ApiConfig;
use rsvp_domain::notify::{ChannelId, Recipient};
use rsvp_domain::registry::InitializedSlice;
use rsvp_kernel::server::ApiState;
use rsvp_notify::{Messenger, Notifier, SendFuture, TransportError};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

#[derive(Debug, Default)]
struct RecordingMessenger {
    reject_all: bool,
    texts: Mutex<Vec<String>>,
}

impl Messenger for RecordingMessenger {
    fn send<'a>(&'a self, _recipient: &'a Recipient, text: &'a str) -> SendFuture<'a> {
        Box::pin(async move {
            self.texts.lock().push(text.to_owned());
            if self.reject_all {
                return Err(TransportError::Rejected { message: "chat not found".into(), context: None });
            }
            Ok(())
        })
    }
}

fn app(messenger: Option<Arc<RecordingMessenger>>) -> Router {
    let mut builder = ApiState::builder().config(ApiConfig::default());
    if let Some(messenger) = messenger {
        let notifier = Notifier::builder()
            .allow_list(["alice"])
            .seed_channels([ChannelId(1), ChannelId(2)])
            .messenger(messenger)
            .build()
            .unwrap();
        builder = builder.register_slice(InitializedSlice::new(notifier));
    }
    let state = builder.build().unwrap();
    let (router, _api) = rsvp_guest::router().with_state(state).split_for_parts();
    router
}

fn post_json(body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn guest() -> Value {
    json!({ "fio": "Ivan Petrov", "telephone": "+79001234567", "transport": "car", "car_number": "A123BC" })
}

#[tokio::test]
async fn accepted_submission_is_forwarded() {
    let messenger = Arc::new(RecordingMessenger::default());

    let (status, body) = send(app(Some(messenger.clone())), post_json(&guest())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    let texts = messenger.texts.lock();
    assert_eq!(texts.len(), 2);
    assert!(texts[0].contains("Ivan Petrov"));
    assert!(texts[0].contains("A123BC"));
}

#[tokio::test]
async fn extra_fields_are_tolerated() {
    let mut body = guest();
    body["comment"] = json!("see you there");

    let (status, _) =
        send(app(Some(Arc::new(RecordingMessenger::default()))), post_json(&body)).await;

    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn non_json_content_type_is_415() {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(guest().to_string()))
        .unwrap();

    let (status, body) = send(app(Some(Arc::new(RecordingMessenger::default()))), request).await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn malformed_json_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"fio\": "))
        .unwrap();

    let (status, _) = send(app(Some(Arc::new(RecordingMessenger::default()))), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn invalid_field_is_400_and_nothing_is_sent() {
    let messenger = Arc::new(RecordingMessenger::default());
    let mut body = guest();
    body["fio"] = json!("I");

    let (status, body) = send(app(Some(messenger.clone())), post_json(&body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("fio"));
    assert!(messenger.texts.lock().is_empty());
}

#[tokio::test]
async fn total_delivery_failure_is_a_generic_500() {
    let messenger = Arc::new(RecordingMessenger { reject_all: true, ..Default::default() });

    let (status, body) = send(app(Some(messenger)), post_json(&guest())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "notification service unavailable");
    assert!(!body.to_string().contains("chat"));
}

#[tokio::test]
async fn missing_notifier_is_a_500() {
    let (status, body) = send(app(None), post_json(&guest())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "notification service unavailable");
}
