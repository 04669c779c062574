//! One-way notifications to the embedding parent page.
//!
//! The only message today is the token-refresh request: fire-and-forget, no
//! acknowledgment, no retry. The parent owns what happens next (it obtains a
//! new token and reloads the page with fresh query parameters).

use std::io::Write;

use serde::Serialize;

pub const TOKEN_REFRESH_TYPE: &str = "NEXTMV_TOKEN_REFRESH";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ParentMessage {
    #[serde(rename = "type")]
    pub kind: String,
}

impl ParentMessage {
    pub fn token_refresh() -> Self {
        Self {
            kind: TOKEN_REFRESH_TYPE.to_string(),
        }
    }
}

pub trait ParentNotifier {
    fn notify(&mut self, msg: &ParentMessage) -> Result<(), String>;
}

/// Publishes each message as one JSON line on the outbound channel.
pub struct LineNotifier<W: Write> {
    out: W,
}

impl<W: Write> LineNotifier<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl LineNotifier<std::io::Stdout> {
    /// stdout is the channel the embedding shell reads.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ParentNotifier for LineNotifier<W> {
    fn notify(&mut self, msg: &ParentMessage) -> Result<(), String> {
        let line = serde_json::to_string(msg).map_err(|e| e.to_string())?;
        writeln!(self.out, "{}", line).map_err(|e| e.to_string())?;
        self.out.flush().map_err(|e| e.to_string())
    }
}

// Stub implementation to make integration explicit.
pub struct NullNotifier;

impl ParentNotifier for NullNotifier {
    fn notify(&mut self, _msg: &ParentMessage) -> Result<(), String> {
        Ok(())
    }
}
