//! Structured error types for the Pagewright composition engine.
//!
//! Configuration problems are detected eagerly (when a config, row or
//! header is built). Image problems are reported here when a caller needs
//! dimensions up front; everywhere else they degrade to inline error text.
//! Backend problems abort generation as a whole.

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The unified error type returned by all public Pagewright API functions.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid margins, over-subscribed grid, late or oversized header/footer.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An image could not be fetched or decoded.
    #[error("Image error for '{key}': {message}")]
    Image { key: String, message: String },

    /// An image extension the engine does not know how to decode.
    #[error("Unsupported image format: '{0}'")]
    UnsupportedFormat(String),

    /// A page could not be realized by the rendering provider.
    #[error("Render error on page {page}: {message}")]
    Render { page: usize, message: String },

    /// The rendering provider failed to serialize the document.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Writing the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON configuration failed to parse.
    #[error("Failed to parse configuration: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub(crate) fn image(key: &str, message: impl Into<String>) -> Self {
        Error::Image {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the configuration schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        Error::Parse { source: e, hint }
    }
}
