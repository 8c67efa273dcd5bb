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

//! Folding the outcome of a completed session into mastery state.

use serde::Deserialize;
use serde::Serialize;

use crate::error::SessionError;
use crate::session::Session;
use crate::session::SessionSummary;
use crate::types::card::CardId;
use crate::types::language::Language;
use crate::types::mastery::MasteryState;
use crate::types::mode::Mode;
use crate::types::session_id::SessionId;
use crate::types::timestamp::Timestamp;

/// One card's change after a completed session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MasteryUpdate {
    pub card_id: CardId,
    pub language: Language,
    pub mode: Mode,
    pub session_id: SessionId,
    pub reviewed_at: Timestamp,
}

/// Everything a completed session writes to the card store. Stores apply a
/// batch all at once or not at all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommitBatch {
    pub summary: SessionSummary,
    pub updates: Vec<MasteryUpdate>,
}

/// Plan the writes for a completed session.
///
/// Every card known at least once gets exactly one update, however many
/// rounds it took. Freestyle review plans none.
pub fn plan_commit(session: &Session) -> Result<CommitBatch, SessionError> {
    let summary = session.summary().ok_or_else(|| {
        SessionError::invalid_state(format!(
            "session {} is not completed; nothing to commit",
            session.id().short()
        ))
    })?;
    let updates: Vec<MasteryUpdate> = if session.mode().updates_mastery() {
        session
            .known_cards()
            .iter()
            .map(|card_id| MasteryUpdate {
                card_id: card_id.clone(),
                language: session.language().clone(),
                mode: session.mode(),
                session_id: session.id(),
                reviewed_at: summary.completed_at,
            })
            .collect()
    } else {
        Vec::new()
    };
    Ok(CommitBatch { summary, updates })
}

/// Apply one update to a card's mastery state. Returns whether the state
/// changed.
///
/// An update from a session that was already folded into the state is
/// ignored, so a batch can be re-applied after a failed write.
pub fn apply_update(state: &mut MasteryState, update: &MasteryUpdate) -> bool {
    if state.committed_session == Some(update.session_id) {
        return false;
    }
    match update.mode {
        Mode::Study => {
            state.study_level = state.study_level.max(1);
        }
        Mode::Recognition => {
            state.recognition_level += 1;
        }
        Mode::FreestyleReview => return false,
    }
    state.last_reviewed_at = Some(update.reviewed_at);
    state.committed_session = Some(update.session_id);
    true
}
