//! Call Session Integration Tests
//!
//! Drives the call-control WebSocket end to end: a client connects to the
//! gateway, announces a new call, fires hooks, and asserts on the frames the
//! gateway sends back.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use weather_agent_gateway::core::weather::WeatherConfig;
use weather_agent_gateway::{AppState, ServerConfig, routes};

type WsClient = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

fn test_config(api_key: Option<&str>, mcp_url: Option<&str>, weather_base: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        google_api_key: api_key.map(String::from),
        mcp_server_url: mcp_url.map(|u| Url::parse(u).unwrap()),
        mcp_server_port: 0,
        weather: WeatherConfig::with_base_url(weather_base),
    }
}

/// Spawn the gateway on an ephemeral port and return its address.
async fn spawn_gateway(config: ServerConfig) -> SocketAddr {
    let state = Arc::new(AppState::new(config).expect("failed to build state"));
    let app = routes::call::create_call_router().with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    addr
}

async fn connect(addr: SocketAddr) -> WsClient {
    let (client, _) = connect_async(format!("ws://{addr}/google-s2s"))
        .await
        .expect("failed to connect to gateway");
    client
}

async fn send_json(client: &mut WsClient, frame: Value) {
    client
        .send(Message::Text(frame.to_string().into()))
        .await
        .expect("failed to send frame");
}

async fn recv_json(client: &mut WsClient) -> Value {
    let msg = timeout(Duration::from_secs(5), client.next())
        .await
        .expect("timed out waiting for frame")
        .expect("stream ended unexpectedly")
        .expect("websocket error");
    let text = msg.into_text().expect("expected text frame");
    serde_json::from_str(&text).expect("frame was not valid JSON")
}

async fn mount_weather_mocks(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"name": "Paris", "latitude": 48.85, "longitude": 2.35}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": {"temperature_2m": 18.2, "wind_speed_10m": 9.7},
            "current_units": {"temperature_2m": "°C", "wind_speed_10m": "km/h"}
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_session_new_returns_call_setup_ack() {
    let addr = spawn_gateway(test_config(Some("test-key"), None, "http://127.0.0.1:9")).await;
    let mut client = connect(addr).await;

    send_json(
        &mut client,
        json!({"type": "session:new", "call_sid": "CA100", "path": "/google-s2s"}),
    )
    .await;

    let ack = recv_json(&mut client).await;
    assert_eq!(ack["type"], "ack");
    let verbs = ack["data"].as_array().unwrap();
    assert_eq!(verbs.len(), 4);
    assert_eq!(verbs[0]["verb"], "answer");
    assert_eq!(verbs[1]["verb"], "pause");
    assert_eq!(verbs[1]["length"], 1);
    assert_eq!(verbs[2]["verb"], "llm");
    assert_eq!(verbs[2]["model"], "models/gemini-2.0-flash-live-001");
    assert_eq!(verbs[2]["auth"]["apiKey"], "test-key");
    assert_eq!(verbs[3]["verb"], "hangup");
}

#[tokio::test]
async fn test_session_new_without_api_key_hangs_up() {
    let addr = spawn_gateway(test_config(None, None, "http://127.0.0.1:9")).await;
    let mut client = connect(addr).await;

    send_json(
        &mut client,
        json!({"type": "session:new", "call_sid": "CA101"}),
    )
    .await;

    let ack = recv_json(&mut client).await;
    assert_eq!(ack["type"], "ack");
    let verbs = ack["data"].as_array().unwrap();
    assert_eq!(verbs.len(), 1);
    assert_eq!(verbs[0]["verb"], "hangup");
}

#[tokio::test]
async fn test_session_new_with_remote_tool_server() {
    let addr = spawn_gateway(test_config(
        Some("test-key"),
        Some("http://tools.example:3001/sse"),
        "http://127.0.0.1:9",
    ))
    .await;
    let mut client = connect(addr).await;

    send_json(
        &mut client,
        json!({"type": "session:new", "call_sid": "CA102"}),
    )
    .await;

    let ack = recv_json(&mut client).await;
    let llm = &ack["data"][2];
    assert_eq!(llm["verb"], "llm");
    assert_eq!(llm["mcpServers"][0]["url"], "http://tools.example:3001/sse");
    assert!(llm["llmOptions"]["setup"].get("tools").is_none());
}

#[tokio::test]
async fn test_tool_call_hook_returns_tool_output_command() {
    let weather = MockServer::start().await;
    mount_weather_mocks(&weather).await;
    let addr = spawn_gateway(test_config(Some("test-key"), None, &weather.uri())).await;
    let mut client = connect(addr).await;

    send_json(
        &mut client,
        json!({"type": "session:new", "call_sid": "CA103"}),
    )
    .await;
    let _ack = recv_json(&mut client).await;

    send_json(
        &mut client,
        json!({
            "type": "hook",
            "hook": "/toolCall",
            "data": {
                "function_calls": [
                    {"name": "get_weather", "args": {"location": "Paris"}, "id": "1"}
                ],
                "tool_call_id": "batch-1"
            }
        }),
    )
    .await;

    let command = recv_json(&mut client).await;
    assert_eq!(command["type"], "command");
    assert_eq!(command["command"], "toolOutput");
    assert_eq!(command["tool_call_id"], "batch-1");
    let response = &command["data"]["toolResponse"]["functionResponses"][0];
    assert_eq!(response["id"], "1");
    assert_eq!(response["response"]["output"]["current"]["temperature_2m"], 18.2);
}

#[tokio::test]
async fn test_tool_call_failure_degrades_to_apology() {
    let weather = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&weather)
        .await;
    let addr = spawn_gateway(test_config(Some("test-key"), None, &weather.uri())).await;
    let mut client = connect(addr).await;

    send_json(
        &mut client,
        json!({"type": "session:new", "call_sid": "CA104"}),
    )
    .await;
    let _ack = recv_json(&mut client).await;

    send_json(
        &mut client,
        json!({
            "type": "hook",
            "hook": "/toolCall",
            "data": {
                "function_calls": [
                    {"name": "get_weather", "args": {"location": "Atlantis"}, "id": "1"}
                ],
                "tool_call_id": "batch-2"
            }
        }),
    )
    .await;

    let command = recv_json(&mut client).await;
    let response = &command["data"]["toolResponse"]["functionResponses"][0];
    assert_eq!(
        response["response"]["output"]["text"],
        "Failed to get the weather for Atlantis. Please try again later."
    );
}

#[tokio::test]
async fn test_final_hook_says_goodbye_and_hangs_up() {
    let addr = spawn_gateway(test_config(Some("test-key"), None, "http://127.0.0.1:9")).await;
    let mut client = connect(addr).await;

    send_json(
        &mut client,
        json!({"type": "session:new", "call_sid": "CA105"}),
    )
    .await;
    let _ack = recv_json(&mut client).await;

    send_json(
        &mut client,
        json!({"type": "hook", "hook": "/final", "data": {"completion_reason": "normal"}}),
    )
    .await;

    let reply = recv_json(&mut client).await;
    assert_eq!(reply["type"], "reply");
    let verbs = reply["data"].as_array().unwrap();
    assert_eq!(verbs[0]["verb"], "say");
    assert_eq!(verbs[0]["text"], "Sorry, your session has ended.");
    assert_eq!(verbs[1]["verb"], "hangup");
}

#[tokio::test]
async fn test_event_hook_and_malformed_frames_are_tolerated() {
    let addr = spawn_gateway(test_config(Some("test-key"), None, "http://127.0.0.1:9")).await;
    let mut client = connect(addr).await;

    send_json(
        &mut client,
        json!({"type": "session:new", "call_sid": "CA106"}),
    )
    .await;
    let _ack = recv_json(&mut client).await;

    // Neither of these produce a reply; the connection must stay usable.
    client
        .send(Message::Text("not json at all".into()))
        .await
        .unwrap();
    send_json(
        &mut client,
        json!({"type": "hook", "hook": "/event", "data": {"kind": "transcript"}}),
    )
    .await;

    send_json(
        &mut client,
        json!({"type": "hook", "hook": "/final", "data": {}}),
    )
    .await;
    let reply = recv_json(&mut client).await;
    assert_eq!(reply["type"], "reply");
}
