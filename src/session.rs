//! Session identity shared by every turn of one process run.

use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;

/// Correlates all turns of a conversation with the engine's checkpoint.
///
/// Created once at startup and passed by reference; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionContext {
    session_id: String,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }

    /// Use the configured id when present, otherwise a fresh random one.
    pub fn from_configured(configured: &str) -> Self {
        let trimmed = configured.trim();
        if trimmed.is_empty() {
            Self::new(generate_session_id())
        } else {
            Self::new(trimmed)
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl fmt::Display for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.session_id)
    }
}

/// Random `xxxx-xxxx-xxxx-xxxx` hex id.
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; 8];
    OsRng.fill_bytes(&mut bytes);
    let hex = format!("{:016x}", u64::from_be_bytes(bytes));
    format!(
        "{}-{}-{}-{}",
        &hex[0..4],
        &hex[4..8],
        &hex[8..12],
        &hex[12..16]
    )
}
