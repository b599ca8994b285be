//! WebSocket handler driving one voice call.
//!
//! The voice platform connects here once per call. On `session:new` the
//! handler issues the call-control sequence that configures a live Gemini
//! audio session; tool-call hooks are dispatched to the weather client; the
//! final hook speaks a closing message and hangs up. Hook failures never
//! escape this module: weather errors degrade to a fixed user-facing text.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, info_span, warn};

use super::messages::{
    FunctionDeclaration, FunctionResponse, GenerationConfig, InboundMessage, LlmAuth, LlmConfig,
    LlmOptions, LlmSetup, McpServerRef, OutboundMessage, PrebuiltVoiceConfig, SpeechConfig,
    SystemInstruction, TextPart, ToolCallEvent, ToolDeclarations, ToolResponse, VoiceConfig,
    WeatherQuery,
};
use super::session::{Session, SessionClosed};
use crate::config::ServerConfig;
use crate::state::AppState;

// =============================================================================
// Constants
// =============================================================================

/// Live-audio model configured for every session.
const GEMINI_MODEL: &str = "models/gemini-2.0-flash-live-001";

/// Model vendor.
const GEMINI_VENDOR: &str = "google";

/// Prebuilt voice used for speech output.
const VOICE_NAME: &str = "Aoede";

/// Fixed system instruction for the agent.
const SYSTEM_INSTRUCTION: &str = "You are a helpful agent named Barbara that can only provide \
                                  weather information. Help the user with their query.";

/// Spoken when the model session ends.
const CLOSING_MESSAGE: &str = "Sorry, your session has ended.";

/// Short pause between answering and starting the model session (seconds).
const ANSWER_PAUSE_SECS: u64 = 1;

/// Callback hook paths registered with the llm verb.
const ACTION_HOOK: &str = "/final";
const EVENT_HOOK: &str = "/event";
const TOOL_HOOK: &str = "/toolCall";

/// The one tool the agent can invoke.
const GET_WEATHER_TOOL: &str = "get_weather";

/// User-facing text substituted for any failed weather lookup.
fn weather_failure_text(location: &str) -> String {
    format!("Failed to get the weather for {location}. Please try again later.")
}

// =============================================================================
// HTTP entry point
// =============================================================================

/// Upgrade the connection and run the call control loop.
pub async fn call_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    debug!("call WebSocket upgrade requested");
    ws.on_upgrade(move |socket| handle_call_socket(socket, state))
}

/// Run one call socket to completion.
async fn handle_call_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (message_tx, mut message_rx) = mpsc::unbounded_channel::<OutboundMessage>();

    // Sender task for outgoing frames
    let sender_task = tokio::spawn(async move {
        while let Some(message) = message_rx.recv().await {
            match serde_json::to_string(&message) {
                Ok(json_str) => {
                    if let Err(e) = sender.send(Message::Text(json_str.into())).await {
                        error!("failed to send call frame: {e}");
                        break;
                    }
                }
                Err(e) => error!("failed to serialize call frame: {e}"),
            }
        }
    });

    // Populated by session:new; hook events arriving earlier are dropped.
    let mut call: Option<(Session, tracing::Span)> = None;

    while let Some(msg_result) = receiver.next().await {
        match msg_result {
            Ok(Message::Text(text)) => {
                let inbound: InboundMessage = match serde_json::from_str(&text) {
                    Ok(msg) => msg,
                    Err(e) => {
                        warn!("unparseable call frame: {e}");
                        continue;
                    }
                };

                if let Err(SessionClosed(call_sid)) =
                    dispatch_inbound(inbound, &mut call, &message_tx, &state).await
                {
                    warn!(call_sid, "outbound channel closed, ending call loop");
                    break;
                }
            }
            Ok(Message::Close(frame)) => {
                let (code, reason) = frame
                    .map(|f| (u16::from(f.code), f.reason.to_string()))
                    .unwrap_or((1000, String::new()));
                match &call {
                    Some((session, _)) => {
                        info!(call_sid = session.call_sid(), code, reason, "session closed")
                    }
                    None => info!(code, reason, "socket closed before session:new"),
                }
                break;
            }
            Ok(_) => {}
            Err(e) => {
                match &call {
                    Some((session, _)) => {
                        error!(call_sid = session.call_sid(), "session received error: {e}")
                    }
                    None => error!("call socket error before session:new: {e}"),
                }
                break;
            }
        }
    }

    sender_task.abort();
    debug!("call socket terminated");
}

/// Route one parsed frame to its handler.
async fn dispatch_inbound(
    inbound: InboundMessage,
    call: &mut Option<(Session, tracing::Span)>,
    message_tx: &mpsc::UnboundedSender<OutboundMessage>,
    state: &Arc<AppState>,
) -> Result<(), SessionClosed> {
    match inbound {
        InboundMessage::SessionNew { call_sid, path } => {
            let span = info_span!("call", call_sid = %call_sid);
            let mut session = Session::new(call_sid, message_tx.clone());
            span.in_scope(|| info!(?path, "new incoming call"));
            on_session_new(state, &mut session)?;
            *call = Some((session, span));
            Ok(())
        }
        InboundMessage::Hook { hook, data } => {
            let Some((session, span)) = call.as_mut() else {
                warn!(hook, "hook received before session:new, dropping");
                return Ok(());
            };
            match hook.as_str() {
                TOOL_HOOK => match serde_json::from_value::<ToolCallEvent>(data) {
                    Ok(evt) => {
                        on_tool_call(state, session, evt)
                            .instrument(span.clone())
                            .await
                    }
                    Err(e) => {
                        span.in_scope(|| warn!("malformed toolCall event: {e}"));
                        Ok(())
                    }
                },
                ACTION_HOOK => span.in_scope(|| on_final(session, &data)),
                EVENT_HOOK => {
                    span.in_scope(|| info!(event = %data, "got eventHook"));
                    Ok(())
                }
                other => {
                    span.in_scope(|| warn!(hook = other, "unregistered hook, ignoring"));
                    Ok(())
                }
            }
        }
        InboundMessage::Close { code, reason } => {
            if let Some((session, span)) = call.as_ref() {
                span.in_scope(|| {
                    info!(code, reason, "session {} closed", session.call_sid());
                });
            }
            Ok(())
        }
        InboundMessage::Error { error } => {
            if let Some((session, span)) = call.as_ref() {
                span.in_scope(|| {
                    error!(err = %error, "session {} received error", session.call_sid());
                });
            }
            Ok(())
        }
    }
}

// =============================================================================
// Event handlers
// =============================================================================

/// Answer the call and configure the live model session, or hang up
/// immediately when no credential is configured.
fn on_session_new(state: &AppState, session: &mut Session) -> Result<(), SessionClosed> {
    let Some(api_key) = state.config.google_api_key.clone() else {
        info!("missing GOOGLE_API_KEY, hanging up");
        return session.hangup().send();
    };

    session
        .answer()
        .pause(ANSWER_PAUSE_SECS)
        .llm(build_llm_config(&state.config, api_key))
        .hangup()
        .send()
}

/// Dispatch each requested invocation and send the aggregated batch response.
///
/// Lookup failures are substituted with a fixed apology; unknown function
/// names are acknowledged with a literal "ok". Nothing propagates.
async fn on_tool_call(
    state: &AppState,
    session: &Session,
    evt: ToolCallEvent,
) -> Result<(), SessionClosed> {
    info!(
        tool_call_id = evt.tool_call_id,
        calls = evt.function_calls.len(),
        "got toolHook"
    );

    let mut function_responses = Vec::with_capacity(evt.function_calls.len());
    for call in &evt.function_calls {
        let response = if call.name == GET_WEATHER_TOOL {
            get_weather_response(state, &call.args).await
        } else {
            json!({ "text": "ok" })
        };
        function_responses.push(FunctionResponse {
            response,
            id: call.id.clone(),
        });
    }

    session.send_tool_output(evt.tool_call_id, ToolResponse { function_responses })
}

/// Execute one weather lookup, degrading any failure to the fixed text.
async fn get_weather_response(state: &AppState, args: &Value) -> Value {
    let query: WeatherQuery = match serde_json::from_value(args.clone()) {
        Ok(query) => query,
        Err(e) => {
            warn!("malformed get_weather args: {e}");
            let location = args
                .get("location")
                .and_then(Value::as_str)
                .unwrap_or("the requested location");
            return json!({ "output": { "text": weather_failure_text(location) } });
        }
    };

    match state.weather.get_weather(&query.location, query.scale).await {
        Ok(weather) => {
            info!(location = query.location, "got response from weather API");
            json!({ "output": weather })
        }
        Err(e) => {
            warn!(location = query.location, "weather lookup failed: {e}");
            json!({ "output": { "text": weather_failure_text(&query.location) } })
        }
    }
}

/// Speak the closing message and end the call.
fn on_final(session: &mut Session, data: &Value) -> Result<(), SessionClosed> {
    info!(event = %data, "got actionHook");
    session.say(CLOSING_MESSAGE).hangup().reply()
}

// =============================================================================
// LLM session configuration
// =============================================================================

/// Build the `llm` verb payload for one call.
///
/// The inline tool schema and the remote tool server reference are mutually
/// exclusive: whichever `MCP_SERVER_URL` selects wins.
fn build_llm_config(config: &ServerConfig, api_key: String) -> LlmConfig {
    let mcp_servers = config.mcp_server_url.as_ref().map(|url| {
        vec![McpServerRef {
            url: url.to_string(),
        }]
    });
    let tools = if mcp_servers.is_none() {
        Some(vec![ToolDeclarations {
            function_declarations: vec![weather_function_declaration()],
        }])
    } else {
        None
    };

    LlmConfig {
        vendor: GEMINI_VENDOR.into(),
        model: GEMINI_MODEL.into(),
        auth: LlmAuth { api_key },
        action_hook: ACTION_HOOK.into(),
        event_hook: EVENT_HOOK.into(),
        tool_hook: TOOL_HOOK.into(),
        mcp_servers,
        llm_options: LlmOptions {
            setup: LlmSetup {
                generation_config: GenerationConfig {
                    speech_config: SpeechConfig {
                        voice_config: VoiceConfig {
                            prebuilt_voice_config: PrebuiltVoiceConfig {
                                voice_name: VOICE_NAME.into(),
                            },
                        },
                    },
                },
                system_instruction: SystemInstruction {
                    parts: vec![TextPart {
                        text: SYSTEM_INSTRUCTION.into(),
                    }],
                },
                tools,
            },
        },
    }
}

/// Inline declaration of the `get_weather` function.
fn weather_function_declaration() -> FunctionDeclaration {
    FunctionDeclaration {
        name: GET_WEATHER_TOOL.into(),
        description: "Get the weather for a location".into(),
        parameters: json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The location to get the weather for"
                },
                "scale": {
                    "type": "string",
                    "enum": ["celsius", "fahrenheit"],
                    "description": "The scale to use for the temperature"
                }
            },
            "required": ["location"]
        }),
    }
}
