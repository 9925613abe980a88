//! HTTP and WebSocket tests against a server bound to an ephemeral port
//! with a scripted model behind it.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use shopbot::prelude::*;
use shopbot_web::{ChatService, WebConfig, spawn_web};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message as WsFrame;

struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ModelReply, ClientError>>>,
}

impl ScriptedModel {
    fn new(replies: Vec<Result<ModelReply, ClientError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
        }
    }
}

impl ModelClient for ScriptedModel {
    fn generate<'a>(&'a self, _request: &'a GenerateRequest) -> GenerateFuture<'a> {
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Api("no scripted reply".into())));
        Box::pin(async move { reply })
    }
}

async fn serve(replies: Vec<Result<ModelReply, ClientError>>) -> (SocketAddr, Arc<ChatService>) {
    let service = Arc::new(ChatService::new(
        Arc::new(ScriptedModel::new(replies)),
        ToolRegistry::new(),
        ChatConfig::default(),
    ));
    let config = WebConfig {
        bind_addr: ([127, 0, 0, 1], 0).into(),
        ..Default::default()
    };
    let addr = spawn_web(service.clone(), config).await.unwrap();
    (addr, service)
}

async fn open_conversation(http: &reqwest::Client, addr: SocketAddr) -> String {
    let body: Value = http
        .post(format!("http://{addr}/api/conversations"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health() {
    let (addr, _) = serve(vec![]).await;
    let body: Value = reqwest::get(format!("http://{addr}/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn new_conversation_starts_with_greeting() {
    let (addr, service) = serve(vec![]).await;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/conversations"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);

    let body: Value = resp.json().await.unwrap();
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["role"], "model");
    assert_eq!(service.conversation_count(), 1);
}

#[tokio::test]
async fn unknown_conversation_is_404() {
    let (addr, _) = serve(vec![]).await;
    let http = reqwest::Client::new();

    let resp = http
        .get(format!("http://{addr}/api/conversations/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

    let resp = http
        .post(format!("http://{addr}/api/chat"))
        .json(&json!({"conversation_id": "nope", "message": "hi"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn blank_message_is_400() {
    let (addr, service) = serve(vec![]).await;
    let resp = reqwest::Client::new()
        .post(format!("http://{addr}/api/chat"))
        .json(&json!({"message": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(service.conversation_count(), 0);
}

#[tokio::test]
async fn tool_turn_updates_stored_cart() {
    let (addr, _) = serve(vec![
        Ok(ModelReply::calls(vec![ToolCall::new(
            "add_to_cart",
            json!({"product_id": "P002", "quantity": 2}),
        )])),
        Ok(ModelReply::text("Added two pairs of Running Shoes Ultra.")),
    ])
    .await;
    let http = reqwest::Client::new();
    let id = open_conversation(&http, addr).await;

    let reply: Value = http
        .post(format!("http://{addr}/api/chat"))
        .json(&json!({"conversation_id": id, "message": "add 2 running shoes"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reply["status"], "completed");
    assert_eq!(reply["conversation_id"], id.as_str());
    assert_eq!(reply["rounds_used"], 2);
    assert_eq!(reply["messages"].as_array().unwrap().len(), 4);

    let snapshot: Value = http
        .get(format!("http://{addr}/api/conversations/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(snapshot["messages"].as_array().unwrap().len(), 5);
    assert_eq!(snapshot["cart"]["item_count"], 2);
    assert_eq!(snapshot["cart"]["subtotal"], 179.98);
    assert_eq!(snapshot["cart"]["total"], 194.38);
}

#[tokio::test]
async fn chat_without_id_opens_conversation() {
    let (addr, service) = serve(vec![Ok(ModelReply::text("Hi there!"))]).await;
    let reply: Value = reqwest::Client::new()
        .post(format!("http://{addr}/api/chat"))
        .json(&json!({"message": "hello"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(service.conversation_count(), 1);
    let id = reply["conversation_id"].as_str().unwrap();
    let snapshot = service.snapshot(id).await.unwrap();
    // greeting + user + answer
    assert_eq!(snapshot.messages.len(), 3);
    assert_eq!(snapshot.messages[2].text(), Some("Hi there!"));
}

#[tokio::test]
async fn failed_turn_returns_apology() {
    let (addr, service) = serve(vec![Err(ClientError::Status {
        status: 500,
        body: "internal".into(),
    })])
    .await;
    let reply: Value = reqwest::Client::new()
        .post(format!("http://{addr}/api/chat"))
        .json(&json!({"message": "hello"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(reply["status"], "failed");
    assert!(reply["error"].as_str().unwrap().contains("500"));
    let messages = reply["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);

    let snapshot = service
        .snapshot(reply["conversation_id"].as_str().unwrap())
        .await
        .unwrap();
    let roles: Vec<Role> = snapshot.messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, [Role::Model, Role::User, Role::Model]);
    assert_eq!(
        snapshot.messages[2].text(),
        Some("I'm sorry, I encountered an error. Please try again.")
    );
}

// ── WebSocket ───────────────────────────────────────────────────────

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn connect_ws(addr: SocketAddr) -> WsStream {
    let (ws, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("Failed to connect");
    ws
}

async fn send_chat(ws: &mut WsStream, frame: Value) {
    ws.send(WsFrame::Text(frame.to_string().into())).await.unwrap();
}

/// Next JSON event from the socket, skipping control frames.
async fn next_event(ws: &mut WsStream) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("socket closed")
            .unwrap();
        if let WsFrame::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

#[tokio::test]
async fn ws_chat_streams_turn_events() {
    let (addr, service) = serve(vec![
        Ok(ModelReply::calls(vec![ToolCall::new(
            "add_to_cart",
            json!({"product_id": "P002", "quantity": 2}),
        )])),
        Ok(ModelReply::text("Added two pairs.")),
    ])
    .await;
    let id = open_conversation(&reqwest::Client::new(), addr).await;
    let mut ws = connect_ws(addr).await;

    send_chat(
        &mut ws,
        json!({"type": "chat", "conversation_id": id, "message": "add 2 running shoes"}),
    )
    .await;

    let mut kinds = Vec::new();
    let complete = loop {
        let event = next_event(&mut ws).await;
        assert_eq!(event["conversation_id"], id.as_str());
        let kind = event["type"].as_str().unwrap().to_string();
        if kind == "turn_complete" {
            break event;
        }
        kinds.push(kind);
    };

    assert_eq!(kinds.first().map(String::as_str), Some("user_message"));
    assert!(kinds.iter().any(|k| k == "tool_executing"));
    let tool_result = kinds.iter().position(|k| k == "tool_result").unwrap();
    let finished = kinds.iter().position(|k| k == "finished").unwrap();
    assert!(tool_result < finished);

    assert_eq!(complete["status"], "completed");
    let messages = complete["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[3]["text"], "Added two pairs.");

    let snapshot = service.snapshot(&id).await.unwrap();
    assert_eq!(snapshot.cart.item_count(), 2);
}

#[tokio::test]
async fn ws_chat_unknown_conversation_reports_error() {
    let (addr, service) = serve(vec![]).await;
    let mut ws = connect_ws(addr).await;

    send_chat(
        &mut ws,
        json!({"type": "chat", "conversation_id": "nope", "message": "hi"}),
    )
    .await;

    let event = next_event(&mut ws).await;
    assert_eq!(event["type"], "error");
    assert_eq!(event["conversation_id"], "nope");
    assert!(event["message"].as_str().unwrap().contains("nope"));
    assert_eq!(service.conversation_count(), 0);
}
