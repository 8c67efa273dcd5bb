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

use std::collections::BTreeMap;

use crate::commit::CommitBatch;
use crate::commit::apply_update;
use crate::error::Fallible;
use crate::error::fail;
use crate::session::SessionSummary;
use crate::types::card::Card;
use crate::types::card::CardId;
use crate::types::language::Language;

/// Persistent home of the card collection and its mastery state.
pub trait CardStore {
    /// A snapshot of every card with a translation into `language`, along
    /// with its current mastery state.
    fn cards(&self, language: &Language) -> Fallible<Vec<Card>>;

    /// Apply the writes of a completed session. Either every update in the
    /// batch is applied or none is. Re-applying a batch is harmless.
    fn apply_mastery_updates(&mut self, batch: &CommitBatch) -> Fallible<()>;
}

/// A card store held entirely in memory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    cards: BTreeMap<CardId, Card>,
    sessions: Vec<SessionSummary>,
}

impl MemoryStore {
    pub fn new(cards: Vec<Card>) -> Self {
        Self {
            cards: cards
                .into_iter()
                .map(|card| (card.id().clone(), card))
                .collect(),
            sessions: Vec::new(),
        }
    }

    pub fn card(&self, id: &CardId) -> Option<&Card> {
        self.cards.get(id)
    }

    /// Completed sessions, oldest first.
    pub fn sessions(&self) -> &[SessionSummary] {
        &self.sessions
    }
}

impl CardStore for MemoryStore {
    fn cards(&self, language: &Language) -> Fallible<Vec<Card>> {
        Ok(self
            .cards
            .values()
            .filter(|card| card.has_translation(language))
            .cloned()
            .collect())
    }

    fn apply_mastery_updates(&mut self, batch: &CommitBatch) -> Fallible<()> {
        // Validate everything before touching anything.
        for update in &batch.updates {
            if !self.cards.contains_key(&update.card_id) {
                return fail(format!("unknown card: '{}'", update.card_id));
            }
        }
        for update in &batch.updates {
            if let Some(card) = self.cards.get_mut(&update.card_id) {
                let mut state = card.mastery(&update.language);
                if apply_update(&mut state, update) {
                    card.set_mastery(update.language.clone(), state);
                }
            }
        }
        if !self.sessions.iter().any(|s| s.id == batch.summary.id) {
            self.sessions.push(batch.summary.clone());
        }
        Ok(())
    }
}
