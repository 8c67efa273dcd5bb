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

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;

/// The activity a session exercises.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// First exposure: the learner reads the card with its translation.
    Study,
    /// The learner must recall the translation before revealing it.
    Recognition,
    /// Casual re-exposure to cards that are already learned. Never changes
    /// mastery.
    FreestyleReview,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Study => "study",
            Mode::Recognition => "recognition",
            Mode::FreestyleReview => "freestyle_review",
        }
    }

    /// Whether decks for this mode are cut down to the session size.
    pub fn is_bounded(&self) -> bool {
        match self {
            Mode::Study | Mode::Recognition => true,
            Mode::FreestyleReview => false,
        }
    }

    /// Whether completing a session in this mode writes mastery updates.
    pub fn updates_mastery(&self) -> bool {
        match self {
            Mode::Study | Mode::Recognition => true,
            Mode::FreestyleReview => false,
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "study" => Ok(Mode::Study),
            "recognition" => Ok(Mode::Recognition),
            "freestyle_review" | "freestyle" => Ok(Mode::FreestyleReview),
            _ => Err(ErrorReport::new(format!("invalid mode: '{s}'"))),
        }
    }
}
