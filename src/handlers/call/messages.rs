//! Wire types for the call control protocol.
//!
//! Inbound frames are tagged by `type`: `session:new` starts a call and
//! `hook` delivers a callback event (`/event`, `/toolCall`, `/final`).
//! Outbound frames are either an `ack`/`reply` carrying a batch of verbs or
//! a `command` carrying tool output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::weather::TemperatureScale;

// =============================================================================
// Inbound frames
// =============================================================================

/// A frame received from the voice platform.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    /// A new call has been handed to this application.
    #[serde(rename = "session:new")]
    SessionNew {
        call_sid: String,
        #[serde(default)]
        path: Option<String>,
    },

    /// A registered callback fired; `hook` is the callback path.
    #[serde(rename = "hook")]
    Hook {
        hook: String,
        #[serde(default)]
        data: Value,
    },

    /// The platform reports the session closed.
    #[serde(rename = "close")]
    Close {
        #[serde(default)]
        code: Option<u16>,
        #[serde(default)]
        reason: Option<String>,
    },

    /// The platform reports a session-level error.
    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        error: Value,
    },
}

/// Tool invocation batch delivered on the `/toolCall` hook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallEvent {
    pub function_calls: Vec<FunctionCall>,
    pub tool_call_id: String,
}

/// One requested function invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Value,
    pub id: String,
}

/// Arguments of a `get_weather` invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherQuery {
    pub location: String,
    #[serde(default)]
    pub scale: TemperatureScale,
}

// =============================================================================
// Outbound frames
// =============================================================================

/// A frame sent back to the voice platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OutboundMessage {
    /// Flush of queued verbs in response to `session:new`.
    Ack { data: Vec<Verb> },

    /// Flush of queued verbs in response to a hook.
    Reply { data: Vec<Verb> },

    /// Aggregated tool output for one tool-call batch.
    Command {
        command: CommandKind,
        tool_call_id: String,
        data: ToolOutputPayload,
    },
}

/// Command discriminator for [`OutboundMessage::Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandKind {
    ToolOutput,
}

/// Aggregated responses for a tool-call batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutputPayload {
    pub tool_response: ToolResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub function_responses: Vec<FunctionResponse>,
}

/// Output for one requested invocation, keyed back to its identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub response: Value,
    pub id: String,
}

// =============================================================================
// Verbs
// =============================================================================

/// Call-control verbs understood by the voice platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "camelCase")]
pub enum Verb {
    Answer,
    Pause { length: u64 },
    Llm(Box<LlmConfig>),
    Say { text: String },
    Hangup,
}

/// Live-model session configuration carried by the `llm` verb.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfig {
    pub vendor: String,
    pub model: String,
    pub auth: LlmAuth,
    pub action_hook: String,
    pub event_hook: String,
    pub tool_hook: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mcp_servers: Option<Vec<McpServerRef>>,
    pub llm_options: LlmOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmAuth {
    pub api_key: String,
}

/// Reference to a remote tool server shared across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpServerRef {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmOptions {
    pub setup: LlmSetup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmSetup {
    pub generation_config: GenerationConfig,
    pub system_instruction: SystemInstruction,
    /// Inline tool schema; mutually exclusive with `mcp_servers` on the
    /// enclosing [`LlmConfig`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDeclarations>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub speech_config: SpeechConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechConfig {
    pub voice_config: VoiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrebuiltVoiceConfig {
    pub voice_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInstruction {
    pub parts: Vec<TextPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDeclarations {
    pub function_declarations: Vec<FunctionDeclaration>,
}

/// One declared function in an inline tool schema. `parameters` is a
/// JSON-Schema-like object passed through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}
