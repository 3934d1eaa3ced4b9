//! HTTP backend tests against a mock server

mod common;

use chatline::api::{BackendError, ChatBackend, ChatRequest, HttpBackend};
use chatline::chat::SendFailure;
use common::api_config;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend(server: &MockServer, token: Option<&str>) -> HttpBackend {
    HttpBackend::new(&api_config(&server.uri()), token.map(str::to_string)).unwrap()
}

#[tokio::test]
async fn test_send_chat_posts_message_with_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("authorization", "Bearer tok-1"))
        .and(body_json(json!({"message": "hello", "conversation_id": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "response": "Hi! How can I help?",
            "conversation_id": "c1",
            "question": "hello",
            "created_at": "2024-03-15T10:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = backend(&server, Some("tok-1"))
        .send_chat(&ChatRequest {
            message: "hello".into(),
            conversation_id: None,
        })
        .await
        .unwrap();

    assert_eq!(reply.response, "Hi! How can I help?");
    assert_eq!(reply.conversation_id, "c1");
    assert!(reply.created_at.is_some());
}

#[tokio::test]
async fn test_rate_limit_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({"detail": "Daily limit reached"})),
        )
        .mount(&server)
        .await;

    let err = backend(&server, Some("t"))
        .send_chat(&ChatRequest {
            message: "hi".into(),
            conversation_id: Some("c1".into()),
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(429));
    assert_eq!(SendFailure::classify(&err), SendFailure::RateLimited);
}

#[tokio::test]
async fn test_server_error_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = backend(&server, Some("t"))
        .send_chat(&ChatRequest {
            message: "hi".into(),
            conversation_id: None,
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        BackendError::Status {
            status: 503,
            detail: None
        }
    );
    assert_eq!(SendFailure::classify(&err), SendFailure::ServiceUnavailable);
}

#[tokio::test]
async fn test_client_error_detail_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Message too long"})),
        )
        .mount(&server)
        .await;

    let err = backend(&server, Some("t"))
        .send_chat(&ChatRequest {
            message: "x".into(),
            conversation_id: None,
        })
        .await
        .unwrap_err();

    let failure = SendFailure::classify(&err);
    assert_eq!(failure.user_message(), "Message too long");
}

#[tokio::test]
async fn test_malformed_reply_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = backend(&server, Some("t"))
        .send_chat(&ChatRequest {
            message: "x".into(),
            conversation_id: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Decode(_)));
    assert_eq!(SendFailure::classify(&err), SendFailure::Unknown);
}

#[tokio::test]
async fn test_list_conversations() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations"))
        .and(header("authorization", "Bearer tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "c1",
                "title": "Trip plans",
                "last_message": "Book the train",
                "created_at": "2024-03-10T08:00:00",
                "updated_at": "2024-03-15T09:30:00"
            },
            {
                "id": "c2",
                "title": "Recipes",
                "updated_at": "2024-01-02T12:00:00Z"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let conversations = backend(&server, Some("tok-2"))
        .list_conversations()
        .await
        .unwrap();

    assert_eq!(conversations.len(), 2);
    assert_eq!(conversations[0].last_message.as_deref(), Some("Book the train"));
    assert!(conversations[1].last_message.is_none());
    assert!(conversations[1].created_at.is_none());
}

#[tokio::test]
async fn test_get_conversation_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Conversation not found"})),
        )
        .mount(&server)
        .await;

    let err = backend(&server, Some("t"))
        .get_conversation("missing")
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert_eq!(err.detail(), Some("Conversation not found"));
}

#[tokio::test]
async fn test_conversation_id_is_one_path_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/conversations/a%2Fb%3Fc%23d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "a/b?c#d",
            "title": "Odd id",
            "messages": []
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/conversations/a%2Fb%3Fc%23d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server, Some("t"));
    let detail = backend.get_conversation("a/b?c#d").await.unwrap();
    assert_eq!(detail.id, "a/b?c#d");
    backend.delete_conversation("a/b?c#d").await.unwrap();
}

#[tokio::test]
async fn test_create_and_delete_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/conversations"))
        .and(body_json(json!({"title": "Ideas"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "c9",
            "title": "Ideas",
            "created_at": "2024-03-15T10:00:00",
            "updated_at": "2024-03-15T10:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/conversations/c9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server, Some("t"));
    let created = backend.create_conversation("Ideas").await.unwrap();
    assert_eq!(created.id, "c9");
    backend.delete_conversation("c9").await.unwrap();
}

#[tokio::test]
async fn test_login_returns_token_and_user() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({"email": "ana@example.com", "password": "pw"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh",
            "token_type": "bearer",
            "user": {"id": "u1", "username": "ana", "email": "ana@example.com"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let login = backend(&server, None)
        .login("ana@example.com", "pw")
        .await
        .unwrap();
    assert_eq!(login.access_token, "fresh");
    assert_eq!(login.user.username, "ana");
}

#[tokio::test]
async fn test_signup_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/signup"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Email already registered"})),
        )
        .mount(&server)
        .await;

    let err = backend(&server, None)
        .signup("ana", "ana@example.com", "pw")
        .await
        .unwrap_err();
    assert_eq!(err.detail(), Some("Email already registered"));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let backend = HttpBackend::new(&api_config("http://127.0.0.1:1"), None).unwrap();
    let err = backend.list_conversations().await.unwrap_err();
    assert!(matches!(err, BackendError::Transport(_)));
    assert_eq!(err.status(), None);
}
