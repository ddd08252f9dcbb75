//! Boundary to the external text-generation service.
//!
//! One request, one response: no retry, no streaming. Implementations decide
//! transport; the session only sees [`TextGenerator`].

use crate::prompt::ReaderAction;
use thiserror::Error;

/// Text substituted when the service answers with no text at all.
pub const EMPTY_RESPONSE_TEXT: &str = "No response could be generated.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub content: String,
    pub action: ReaderAction,
    pub custom_prompt: Option<String>,
    /// Base64 JPEG, optionally still wrapped in a `data:` URL.
    pub image: Option<String>,
}

impl GenerationRequest {
    pub fn new(content: impl Into<String>, action: ReaderAction) -> Self {
        Self {
            content: content.into(),
            action,
            custom_prompt: None,
            image: None,
        }
    }

    pub fn with_custom_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.custom_prompt = Some(prompt.into());
        self
    }

    pub fn with_image(mut self, image_base64: impl Into<String>) -> Self {
        self.image = Some(image_base64.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("missing API key: set the {0} environment variable")]
    MissingApiKey(String),
    #[error("failed to read image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request to the generation service failed: {0}")]
    Transport(String),
    #[error("generation service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("could not decode generation response: {0}")]
    Decode(String),
}

impl GenerationError {
    /// The single message shown to a user for any generation failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingApiKey(_) => "The design engine is not configured (missing API key).",
            _ => "The design engine failed to process the request. Check your data format.",
        }
    }
}

pub trait TextGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}

impl<F> TextGenerator for F
where
    F: Fn(&GenerationRequest) -> Result<String, GenerationError>,
{
    fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self(request)
    }
}

/// Drop a `data:<mime>;base64,` prefix, keeping the payload.
pub fn strip_data_url(image: &str) -> &str {
    match image.split_once(',') {
        Some((prefix, payload)) if prefix.starts_with("data:") => payload,
        _ => image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_generators() {
        let echo = |req: &GenerationRequest| -> Result<String, GenerationError> {
            Ok(format!("{}:{}", req.action.label(), req.content))
        };
        let request = GenerationRequest::new("beam", ReaderAction::TorsionCheck);
        assert_eq!(echo.generate(&request).unwrap(), "Torsion check:beam");
    }

    #[test]
    fn data_url_prefix_is_removed() {
        assert_eq!(strip_data_url("data:image/jpeg;base64,QUJD"), "QUJD");
        assert_eq!(strip_data_url("QUJD"), "QUJD");
    }

    #[test]
    fn user_message_hides_transport_detail() {
        let err = GenerationError::Status {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert!(!err.user_message().contains("503"));
        assert!(err.to_string().contains("503"));
    }
}
