use serde_json::Value;

/// Failure reported by the card registry, classified once at the client boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("record already exists: {0}")]
    AlreadyExists(String),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("registry rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("request could not be built: {0}")]
    Request(String),
    #[error("registry unreachable: {0}")]
    Transport(String),
    #[error("registry returned an unreadable payload: {0}")]
    Decode(String),
}

const DUPLICATE_MARKER: &str = "already exists";

impl RegistryError {
    /// Classify a non-2xx response from its status code and body.
    pub fn from_failure(status: u16, body: &str) -> Self {
        let message = failure_message(body).unwrap_or_else(|| format!("HTTP {status}"));

        if status == 409 || message.to_ascii_lowercase().contains(DUPLICATE_MARKER) {
            return Self::AlreadyExists(message);
        }
        if status == 404 {
            return Self::NotFound(message);
        }
        Self::Rejected { status, message }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::AlreadyExists(_))
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::Request(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

fn failure_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(Value::Object(payload)) = serde_json::from_str::<Value>(trimmed) {
        for key in ["message", "error", "detail", "title"] {
            if let Some(Value::String(text)) = payload.get(key) {
                if !text.trim().is_empty() {
                    return Some(text.trim().to_string());
                }
            }
        }
    }

    Some(trimmed.to_string())
}
