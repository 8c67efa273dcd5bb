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

use serde::Deserialize;
use serde::Serialize;

use crate::types::mode::Mode;
use crate::types::session_id::SessionId;
use crate::types::timestamp::Timestamp;

/// How well a card is known in one target language.
///
/// The counters only ever grow, except through an explicit reset of the
/// whole language.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasteryState {
    /// 0 if the card was never studied, 1 once a study session with it
    /// completed.
    pub study_level: u32,
    /// Number of completed recognition sessions in which the card was
    /// recognized.
    pub recognition_level: u32,
    /// When the card was last part of a completed session.
    pub last_reviewed_at: Option<Timestamp>,
    /// The last session whose outcome was folded into this state.
    pub committed_session: Option<SessionId>,
}

impl MasteryState {
    /// The level the mastery ceiling is compared against in a given mode.
    /// Freestyle review has no such level.
    pub fn level_for(&self, mode: Mode) -> Option<u32> {
        match mode {
            Mode::Study => Some(self.study_level),
            Mode::Recognition => Some(self.recognition_level),
            Mode::FreestyleReview => None,
        }
    }

    pub fn is_new(&self) -> bool {
        self.study_level == 0 && self.recognition_level == 0
    }
}
