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

use lexicards_core::SessionError;

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
}

impl From<std::io::Error> for ErrorReport {
    fn from(value: std::io::Error) -> Self {
        ErrorReport {
            message: format!("I/O error: {value}"),
        }
    }
}

impl From<rusqlite::Error> for ErrorReport {
    fn from(value: rusqlite::Error) -> Self {
        ErrorReport {
            message: format!("Database error: {value}"),
        }
    }
}

impl From<toml::de::Error> for ErrorReport {
    fn from(value: toml::de::Error) -> Self {
        ErrorReport {
            message: format!("Configuration error: {}", value.message()),
        }
    }
}

impl From<serde_json::Error> for ErrorReport {
    fn from(value: serde_json::Error) -> Self {
        ErrorReport {
            message: format!("JSON error: {value}"),
        }
    }
}

impl From<walkdir::Error> for ErrorReport {
    fn from(value: walkdir::Error) -> Self {
        ErrorReport {
            message: format!("Failed to walk collection directory: {value}"),
        }
    }
}

impl From<lexicards_core::ErrorReport> for ErrorReport {
    fn from(value: lexicards_core::ErrorReport) -> Self {
        ErrorReport {
            message: value.message().to_string(),
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

#[cfg(test)]
impl From<reqwest::Error> for ErrorReport {
    fn from(value: reqwest::Error) -> Self {
        ErrorReport {
            message: format!("HTTP error: {value}"),
        }
    }
}

/// Lets the binary's stores report through the core `CardStore` trait.
impl From<ErrorReport> for lexicards_core::ErrorReport {
    fn from(value: ErrorReport) -> Self {
        lexicards_core::ErrorReport::new(value.message)
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
