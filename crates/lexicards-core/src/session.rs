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

//! The study session state machine.
//!
//! A session walks through its current round one card at a time. Cards the
//! learner does not know go onto the review pile, and when the round ends
//! the pile becomes the next round. The session completes at the end of a
//! round with an empty pile.

use std::collections::BTreeSet;
use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use crate::config::DEFAULT_MASTERY_CEILING;
use crate::config::DEFAULT_MAX_ROUNDS;
use crate::config::EngineConfig;
use crate::deck::Deck;
use crate::error::SessionError;
use crate::types::card::CardId;
use crate::types::language::Language;
use crate::types::mode::Mode;
use crate::types::session_id::SessionId;
use crate::types::timestamp::Timestamp;

/// Limits applied while a session runs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionPolicy {
    /// A failed card is re-queued only while its pre-session level is below
    /// this value.
    pub mastery_ceiling: u32,
    /// Upper bound on the number of rounds, counting the first one.
    pub max_rounds: usize,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            mastery_ceiling: DEFAULT_MASTERY_CEILING,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

impl From<&EngineConfig> for SessionPolicy {
    fn from(config: &EngineConfig) -> Self {
        Self {
            mastery_ceiling: config.mastery_ceiling,
            max_rounds: config.max_rounds,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Completed { at: Timestamp },
    Exited { at: Timestamp },
}

/// What happened after recording an outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The round continues with the next card.
    Next,
    /// The previous round ended with failures; a new round over them began.
    NewRound { round: usize, cards: usize },
    /// The session is complete.
    Completed,
}

/// A completed session, as recorded in the session history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub mode: Mode,
    pub language: Language,
    pub started_at: Timestamp,
    pub completed_at: Timestamp,
    pub rounds: usize,
    pub cards: usize,
    pub known: usize,
    pub attempts: usize,
}

#[derive(Clone, Debug)]
pub struct Session {
    id: SessionId,
    mode: Mode,
    language: Language,
    original: Vec<CardId>,
    round: Vec<CardId>,
    review_pile: Vec<CardId>,
    position: usize,
    round_number: usize,
    started_at: Timestamp,
    status: SessionStatus,
    known: BTreeSet<CardId>,
    levels: HashMap<CardId, u32>,
    policy: SessionPolicy,
    attempts: usize,
}

impl Session {
    /// Start a session over a deck, in deck order.
    pub fn start(
        deck: Deck,
        started_at: Timestamp,
        policy: SessionPolicy,
    ) -> Result<Self, SessionError> {
        if deck.is_empty() {
            return Err(SessionError::EmptyDeck);
        }
        let (language, mode, cards, levels) = deck.into_parts();
        let id = SessionId::derive(started_at, mode, &language, &cards);
        log::info!(
            "Starting {mode} session {} over {} cards in '{language}'",
            id.short(),
            cards.len()
        );
        Ok(Self {
            id,
            mode,
            language,
            original: cards.clone(),
            round: cards,
            review_pile: Vec::new(),
            position: 0,
            round_number: 1,
            started_at,
            status: SessionStatus::Active,
            known: BTreeSet::new(),
            levels,
            policy,
            attempts: 0,
        })
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn started_at(&self) -> Timestamp {
        self.started_at
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, SessionStatus::Completed { .. })
    }

    pub fn is_exited(&self) -> bool {
        matches!(self.status, SessionStatus::Exited { .. })
    }

    pub fn completed_at(&self) -> Option<Timestamp> {
        match self.status {
            SessionStatus::Completed { at } => Some(at),
            _ => None,
        }
    }

    /// The card awaiting an outcome, if the session is active.
    pub fn current_card(&self) -> Option<&CardId> {
        if self.is_active() {
            self.round.get(self.position)
        } else {
            None
        }
    }

    pub fn round(&self) -> &[CardId] {
        &self.round
    }

    pub fn original_cards(&self) -> &[CardId] {
        &self.original
    }

    pub fn review_pile(&self) -> &[CardId] {
        &self.review_pile
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// 1 for the initial round, incremented by every review round.
    pub fn round_number(&self) -> usize {
        self.round_number
    }

    /// Cards answered "known" at least once. Emptied when the session is
    /// abandoned.
    pub fn known_cards(&self) -> &BTreeSet<CardId> {
        &self.known
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    pub fn remaining_in_round(&self) -> usize {
        if self.is_active() {
            self.round.len() - self.position
        } else {
            0
        }
    }

    pub fn summary(&self) -> Option<SessionSummary> {
        let completed_at = self.completed_at()?;
        Some(SessionSummary {
            id: self.id,
            mode: self.mode,
            language: self.language.clone(),
            started_at: self.started_at,
            completed_at,
            rounds: self.round_number,
            cards: self.original.len(),
            known: self.known.len(),
            attempts: self.attempts,
        })
    }

    /// The learner knew the current card.
    pub fn record_known(&mut self, card: &CardId, now: Timestamp) -> Result<Step, SessionError> {
        self.check_current(card)?;
        self.review_pile.retain(|id| id != card);
        self.known.insert(card.clone());
        self.attempts += 1;
        self.advance(now)
    }

    /// The learner did not know the current card.
    pub fn record_unknown(
        &mut self,
        card: &CardId,
        now: Timestamp,
    ) -> Result<Step, SessionError> {
        self.check_current(card)?;
        if self.requeues(card) && !self.review_pile.contains(card) {
            self.review_pile.push(card.clone());
        }
        self.attempts += 1;
        self.advance(now)
    }

    pub fn record(
        &mut self,
        card: &CardId,
        knew: bool,
        now: Timestamp,
    ) -> Result<Step, SessionError> {
        if knew {
            self.record_known(card, now)
        } else {
            self.record_unknown(card, now)
        }
    }

    /// Abandon the session. Nothing learned in it will be committed.
    pub fn exit(&mut self, now: Timestamp) -> Result<(), SessionError> {
        self.ensure_active()?;
        log::info!(
            "Session {} exited in round {}; discarding progress on {} cards",
            self.id.short(),
            self.round_number,
            self.known.len()
        );
        self.status = SessionStatus::Exited { at: now };
        self.known.clear();
        self.review_pile.clear();
        Ok(())
    }

    fn requeues(&self, card: &CardId) -> bool {
        match self.mode {
            Mode::Study | Mode::Recognition => {
                let level = self.levels.get(card).copied().unwrap_or(0);
                level < self.policy.mastery_ceiling
            }
            Mode::FreestyleReview => true,
        }
    }

    fn ensure_active(&self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::Active => Ok(()),
            SessionStatus::Completed { .. } => Err(SessionError::invalid_state(format!(
                "session {} is already completed",
                self.id.short()
            ))),
            SessionStatus::Exited { .. } => Err(SessionError::invalid_state(format!(
                "session {} was exited",
                self.id.short()
            ))),
        }
    }

    fn check_current(&self, card: &CardId) -> Result<(), SessionError> {
        self.ensure_active()?;
        match self.round.get(self.position) {
            Some(current) if current == card => Ok(()),
            Some(current) => Err(SessionError::invalid_state(format!(
                "expected an outcome for card '{current}', got '{card}'"
            ))),
            None => Err(SessionError::invalid_state("no card at the current position")),
        }
    }

    fn advance(&mut self, now: Timestamp) -> Result<Step, SessionError> {
        self.position += 1;
        if self.position < self.round.len() {
            return Ok(Step::Next);
        }
        if self.review_pile.is_empty() {
            self.status = SessionStatus::Completed { at: now };
            log::info!(
                "Session {} completed after {} rounds and {} attempts",
                self.id.short(),
                self.round_number,
                self.attempts
            );
            return Ok(Step::Completed);
        }
        if self.round_number >= self.policy.max_rounds {
            log::warn!(
                "Session {} hit the limit of {} rounds; abandoning it",
                self.id.short(),
                self.policy.max_rounds
            );
            self.status = SessionStatus::Exited { at: now };
            self.known.clear();
            self.review_pile.clear();
            return Err(SessionError::RoundLimit {
                limit: self.policy.max_rounds,
            });
        }
        self.round = std::mem::take(&mut self.review_pile);
        self.position = 0;
        self.round_number += 1;
        log::debug!(
            "Session {} starting review round {} with {} cards",
            self.id.short(),
            self.round_number,
            self.round.len()
        );
        Ok(Step::NewRound {
            round: self.round_number,
            cards: self.round.len(),
        })
    }
}
