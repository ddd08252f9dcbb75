//! Request lifecycle as explicit state transitions.
//!
//! A [`Session`] is never mutated in place: [`Session::apply`] returns the
//! next state, and a rejected event leaves the caller holding the previous
//! one. At most one request is in flight, guarded by [`Phase::Processing`].

use chrono::{Local, Utc};
use thiserror::Error;

use crate::extract::extract_drawing;
use crate::generate::{GenerationError, GenerationRequest, TextGenerator};
use crate::ir::DiagramDescription;
use crate::prompt::ReaderAction;

pub const HISTORY_LIMIT: usize = 5;
pub const HISTORY_PREVIEW_CHARS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Processing,
}

#[derive(Debug)]
pub enum Event {
    Submit(GenerationRequest),
    Success(String),
    Failure(GenerationError),
    Reset,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("paste your beam data structure (JSON) before running an action")]
    EmptyInput,
    #[error("a request is already being processed")]
    Busy,
    #[error("no request is being processed")]
    NotProcessing,
}

/// The response of the last completed request.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub action: ReaderAction,
    pub text: String,
    pub drawing: Option<DiagramDescription>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryItem {
    pub id: String,
    pub input: String,
    pub output: String,
    pub action: ReaderAction,
    pub date: String,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    phase: Phase,
    pending: Option<GenerationRequest>,
    outcome: Option<Outcome>,
    error: Option<String>,
    history: Vec<HistoryItem>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_processing(&self) -> bool {
        self.phase == Phase::Processing
    }

    pub fn pending(&self) -> Option<&GenerationRequest> {
        self.pending.as_ref()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn drawing(&self) -> Option<&DiagramDescription> {
        self.outcome.as_ref().and_then(|o| o.drawing.as_ref())
    }

    /// User-facing message of the last failed request.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Completed requests, newest first.
    pub fn history(&self) -> &[HistoryItem] {
        &self.history
    }

    pub fn apply(&self, event: Event) -> Result<Session, SessionError> {
        match (self.phase, event) {
            (Phase::Processing, Event::Submit(_)) => Err(SessionError::Busy),
            (Phase::Idle, Event::Submit(request)) => {
                check_content(&request.content)?;
                Ok(Session {
                    phase: Phase::Processing,
                    pending: Some(request),
                    outcome: None,
                    error: None,
                    history: self.history.clone(),
                })
            }
            (Phase::Idle, Event::Success(_) | Event::Failure(_)) => Err(SessionError::NotProcessing),
            (Phase::Processing, Event::Success(text)) => {
                let request = self.pending.clone().ok_or(SessionError::NotProcessing)?;
                let drawing = extract_drawing(&text);
                let mut history = Vec::with_capacity(HISTORY_LIMIT);
                history.push(history_item(&request, &text));
                history.extend(self.history.iter().take(HISTORY_LIMIT - 1).cloned());
                Ok(Session {
                    phase: Phase::Idle,
                    pending: None,
                    outcome: Some(Outcome {
                        action: request.action,
                        text,
                        drawing,
                    }),
                    error: None,
                    history,
                })
            }
            (Phase::Processing, Event::Failure(err)) => {
                tracing::error!(error = %err, "generation failed");
                Ok(Session {
                    phase: Phase::Idle,
                    pending: None,
                    outcome: None,
                    error: Some(err.user_message().to_string()),
                    history: self.history.clone(),
                })
            }
            (Phase::Processing, Event::Reset) => Err(SessionError::Busy),
            (Phase::Idle, Event::Reset) => Ok(Session {
                history: self.history.clone(),
                ..Session::default()
            }),
        }
    }

    /// Submit, call the generator once, and settle on the result.
    pub fn run(&self, request: GenerationRequest, generator: &dyn TextGenerator) -> Result<Session, SessionError> {
        let processing = self.apply(Event::Submit(request))?;
        let result = match processing.pending() {
            Some(pending) => generator.generate(pending),
            None => return Err(SessionError::NotProcessing),
        };
        match result {
            Ok(text) => processing.apply(Event::Success(text)),
            Err(err) => processing.apply(Event::Failure(err)),
        }
    }
}

/// Reject blank beam data before any work is spent on the request.
pub fn check_content(content: &str) -> Result<(), SessionError> {
    if content.trim().is_empty() {
        return Err(SessionError::EmptyInput);
    }
    Ok(())
}

fn history_item(request: &GenerationRequest, output: &str) -> HistoryItem {
    HistoryItem {
        id: Utc::now().timestamp_millis().to_string(),
        input: request.content.chars().take(HISTORY_PREVIEW_CHARS).collect(),
        output: output.to_string(),
        action: request.action,
        date: Local::now().format("%H:%M:%S").to_string(),
    }
}
