// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use crate::parser::ParserError;

#[derive(Debug, PartialEq)]
pub struct ErrorReport {
    message: String,
}

impl ErrorReport {
    pub fn new(msg: impl Into<String>) -> Self {
        ErrorReport {
            message: msg.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(value: serde_json::Error) -> Self {
        ErrorReport {
            message: format!("JSON error: {value}"),
        }
    }
}

impl From<ParserError> for ErrorReport {
    fn from(value: ParserError) -> Self {
        ErrorReport {
            message: format!("Parse error: {value}"),
        }
    }
}

impl From<SessionError> for ErrorReport {
    fn from(value: SessionError) -> Self {
        ErrorReport {
            message: value.to_string(),
        }
    }
}

impl Display for ErrorReport {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "error: {}", self.message)
    }
}

impl Error for ErrorReport {}

pub type Fallible<T> = Result<T, ErrorReport>;

pub fn fail<T>(msg: impl Into<String>) -> Fallible<T> {
    Err(ErrorReport {
        message: msg.into(),
    })
}

/// Errors raised by the study session engine.
#[derive(Debug, PartialEq)]
pub enum SessionError {
    /// No card is eligible for the requested session. Callers present this
    /// as "nothing to study" and never construct a session.
    EmptyDeck,
    /// An operation was invoked on a terminal session, or with a card that
    /// is not the current one. The caller is out of sync with the session.
    InvalidState(String),
    /// The session ran through more review rounds than the configured
    /// bound and was abandoned.
    RoundLimit { limit: usize },
    /// The card store could not produce a snapshot.
    Load(ErrorReport),
    /// The card store rejected the mastery updates of a completed session.
    /// The session stays completed; the batch can be re-applied.
    Commit(ErrorReport),
}

impl SessionError {
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        SessionError::InvalidState(msg.into())
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::EmptyDeck => write!(f, "no eligible cards for this session"),
            SessionError::InvalidState(msg) => write!(f, "invalid session state: {msg}"),
            SessionError::RoundLimit { limit } => {
                write!(f, "session exceeded the limit of {limit} review rounds")
            }
            SessionError::Load(report) => write!(f, "failed to load cards: {}", report.message),
            SessionError::Commit(report) => {
                write!(f, "failed to commit session progress: {}", report.message)
            }
        }
    }
}

impl Error for SessionError {}
