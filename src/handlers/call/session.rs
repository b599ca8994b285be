//! Per-call session handle.
//!
//! A `Session` owns the call SID, the outbound frame channel, and the queue
//! of verbs accumulated between flushes. Handlers receive it explicitly;
//! there is no ambient per-call state. Verb methods are fluent so handler
//! code reads like the call-control sequence it emits:
//!
//! ```rust,ignore
//! session.answer().pause(1).llm(config).hangup().send()?;
//! ```

use tokio::sync::mpsc;

use super::messages::{
    CommandKind, LlmConfig, OutboundMessage, ToolOutputPayload, ToolResponse, Verb,
};

/// The outbound side of the call socket went away mid-call.
#[derive(Debug, thiserror::Error)]
#[error("session {0}: outbound channel closed")]
pub struct SessionClosed(pub String);

/// One active voice call and its outbound command channel.
#[derive(Debug)]
pub struct Session {
    call_sid: String,
    tx: mpsc::UnboundedSender<OutboundMessage>,
    queue: Vec<Verb>,
}

impl Session {
    pub fn new(call_sid: impl Into<String>, tx: mpsc::UnboundedSender<OutboundMessage>) -> Self {
        Self {
            call_sid: call_sid.into(),
            tx,
            queue: Vec::new(),
        }
    }

    /// Unique identifier of the call this session belongs to.
    pub fn call_sid(&self) -> &str {
        &self.call_sid
    }

    pub fn answer(&mut self) -> &mut Self {
        self.queue.push(Verb::Answer);
        self
    }

    pub fn pause(&mut self, length: u64) -> &mut Self {
        self.queue.push(Verb::Pause { length });
        self
    }

    pub fn llm(&mut self, config: LlmConfig) -> &mut Self {
        self.queue.push(Verb::Llm(Box::new(config)));
        self
    }

    pub fn say(&mut self, text: impl Into<String>) -> &mut Self {
        self.queue.push(Verb::Say { text: text.into() });
        self
    }

    pub fn hangup(&mut self) -> &mut Self {
        self.queue.push(Verb::Hangup);
        self
    }

    /// Flush queued verbs as an `ack` frame (responds to `session:new`).
    pub fn send(&mut self) -> Result<(), SessionClosed> {
        let data = std::mem::take(&mut self.queue);
        self.emit(OutboundMessage::Ack { data })
    }

    /// Flush queued verbs as a `reply` frame (responds to a hook).
    pub fn reply(&mut self) -> Result<(), SessionClosed> {
        let data = std::mem::take(&mut self.queue);
        self.emit(OutboundMessage::Reply { data })
    }

    /// Send aggregated tool output for one batch.
    pub fn send_tool_output(
        &self,
        tool_call_id: impl Into<String>,
        tool_response: ToolResponse,
    ) -> Result<(), SessionClosed> {
        self.emit(OutboundMessage::Command {
            command: CommandKind::ToolOutput,
            tool_call_id: tool_call_id.into(),
            data: ToolOutputPayload { tool_response },
        })
    }

    fn emit(&self, message: OutboundMessage) -> Result<(), SessionClosed> {
        self.tx
            .send(message)
            .map_err(|_| SessionClosed(self.call_sid.clone()))
    }
}
