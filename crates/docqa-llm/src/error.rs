use thiserror::Error;

/// Failures of a chat-completion call. Never rendered into answer text by the client.
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    #[error("Invalid LLM configuration: {0}")]
    Config(String),

    /// Network connectivity or the HTTP request itself.
    #[error("Network request failed: {message}")]
    Request { message: String, url: Option<String> },

    /// The provider returned a non-success status code or an embedded error object.
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limit exceeded. Please wait and try again.")]
    RateLimited,

    #[error("Authentication failed. Please check your API key.")]
    Authentication,

    #[error("The request to the LLM provider timed out.")]
    Timeout,

    #[error("Failed to deserialize response data: {0}")]
    Deserialization(String),

    /// The response parsed but carried no usable message content.
    #[error("The model returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for LlmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Request { message: e.to_string(), url: e.url().map(|u| u.to_string()) }
        }
    }
}

/// Truncate large response bodies so error strings remain bounded.
pub(crate) fn truncate_for_error(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max).collect();
        format!("{head}…<snip>")
    }
}
