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

//! Wires a card store, a clock and a random source to the session engine.

use crate::clock::Clock;
use crate::commit::plan_commit;
use crate::config::EngineConfig;
use crate::deck::DeckRequest;
use crate::deck::build_deck;
use crate::error::SessionError;
use crate::rng::RandomSource;
use crate::session::Session;
use crate::session::SessionPolicy;
use crate::session::Step;
use crate::store::CardStore;
use crate::types::card::CardId;
use crate::types::language::Language;
use crate::types::mode::Mode;

pub struct Engine<S, C, R> {
    store: S,
    clock: C,
    rng: R,
    config: EngineConfig,
}

impl<S: CardStore, C: Clock, R: RandomSource> Engine<S, C, R> {
    pub fn new(store: S, clock: C, rng: R, config: EngineConfig) -> Self {
        Self {
            store,
            clock,
            rng,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A deck request sized by this engine's configuration.
    pub fn request(&self, language: Language, mode: Mode) -> DeckRequest {
        DeckRequest::new(language, mode).with_session_size(self.config.session_size)
    }

    /// Read a snapshot from the store and start a session over a freshly
    /// drawn deck.
    pub fn start(&mut self, request: &DeckRequest) -> Result<Session, SessionError> {
        let cards = self
            .store
            .cards(&request.language)
            .map_err(SessionError::Load)?;
        let deck = build_deck(&cards, request, &mut self.rng)?;
        Session::start(deck, self.clock.now(), SessionPolicy::from(&self.config))
    }

    pub fn record_known(
        &mut self,
        session: &mut Session,
        card: &CardId,
    ) -> Result<Step, SessionError> {
        self.record(session, card, true)
    }

    pub fn record_unknown(
        &mut self,
        session: &mut Session,
        card: &CardId,
    ) -> Result<Step, SessionError> {
        self.record(session, card, false)
    }

    /// Record an outcome. When it completes the session, the session's
    /// progress is committed before returning.
    pub fn record(
        &mut self,
        session: &mut Session,
        card: &CardId,
        knew: bool,
    ) -> Result<Step, SessionError> {
        let step = session.record(card, knew, self.clock.now())?;
        if step == Step::Completed {
            self.commit(session)?;
        }
        Ok(step)
    }

    /// Abandon a session. Nothing reaches the store.
    pub fn exit(&mut self, session: &mut Session) -> Result<(), SessionError> {
        session.exit(self.clock.now())
    }

    /// Write a completed session's progress to the store, returning the
    /// number of card updates. Safe to call again after a failure.
    pub fn commit(&mut self, session: &Session) -> Result<usize, SessionError> {
        let batch = plan_commit(session)?;
        match self.store.apply_mastery_updates(&batch) {
            Ok(()) => {
                log::debug!(
                    "Committed {} updates for session {}",
                    batch.updates.len(),
                    session.id().short()
                );
                Ok(batch.updates.len())
            }
            Err(e) => {
                log::error!(
                    "Failed to commit session {}: {}",
                    session.id().short(),
                    e.message()
                );
                Err(SessionError::Commit(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::commit::CommitBatch;
    use crate::error::ErrorReport;
    use crate::error::Fallible;
    use crate::error::fail;
    use crate::rng::TinyRng;
    use crate::store::MemoryStore;
    use crate::types::card::Card;
    use crate::types::mastery::MasteryState;
    use crate::types::timestamp::Timestamp;

    /// Fails the first `failures` writes.
    struct FlakyStore {
        inner: MemoryStore,
        failures: usize,
    }

    impl CardStore for FlakyStore {
        fn cards(&self, language: &Language) -> Fallible<Vec<Card>> {
            self.inner.cards(language)
        }

        fn apply_mastery_updates(&mut self, batch: &CommitBatch) -> Fallible<()> {
            if self.failures > 0 {
                self.failures -= 1;
                return fail("disk is full");
            }
            self.inner.apply_mastery_updates(batch)
        }
    }

    struct BrokenStore;

    impl CardStore for BrokenStore {
        fn cards(&self, _language: &Language) -> Fallible<Vec<Card>> {
            fail("database is locked")
        }

        fn apply_mastery_updates(&mut self, _batch: &CommitBatch) -> Fallible<()> {
            fail("database is locked")
        }
    }

    fn de() -> Language {
        Language::new("de")
    }

    fn start_time() -> Timestamp {
        Timestamp::try_from("2024-05-01T12:00:00.000").unwrap()
    }

    fn card(id: &str) -> Card {
        Card::new(CardId::new(id), id).with_translation(de(), format!("{id}-de"))
    }

    fn known(card: Card, recognition: u32) -> Card {
        card.with_mastery(
            de(),
            MasteryState {
                study_level: 1,
                recognition_level: recognition,
                ..Default::default()
            },
        )
    }

    fn engine<S: CardStore>(store: S) -> Engine<S, ManualClock, TinyRng> {
        Engine::new(
            store,
            ManualClock::new(start_time()),
            TinyRng::from_seed(11),
            EngineConfig::default(),
        )
    }

    fn mastery(engine: &Engine<MemoryStore, ManualClock, TinyRng>, id: &str) -> MasteryState {
        engine
            .store()
            .card(&CardId::new(id))
            .unwrap()
            .mastery(&de())
    }

    #[test]
    fn test_study_scenario_end_to_end() {
        let store = MemoryStore::new(vec![card("a"), card("b"), card("c")]);
        let mut engine = engine(store);
        let request = engine.request(de(), Mode::Study);
        let mut session = engine.start(&request).unwrap();
        assert_eq!(session.original_cards().len(), 3);

        // Fail the second card of the first round, know everything else.
        let mut failed: Option<CardId> = None;
        while let Some(card) = session.current_card().cloned() {
            engine.clock().advance_millis(1000);
            let knew = !(session.round_number() == 1 && session.position() == 1);
            if !knew {
                failed = Some(card.clone());
            }
            engine.record(&mut session, &card, knew).unwrap();
        }
        assert!(session.is_completed());
        assert_eq!(session.round_number(), 2);
        assert!(failed.is_some());

        let completed_at = session.completed_at().unwrap();
        for id in ["a", "b", "c"] {
            let state = mastery(&engine, id);
            assert_eq!(state.study_level, 1);
            assert_eq!(state.recognition_level, 0);
            assert_eq!(state.last_reviewed_at, Some(completed_at));
        }
        assert_eq!(engine.store().sessions().len(), 1);
    }

    #[test]
    fn test_exit_leaves_store_untouched() {
        let cards: Vec<Card> = (0..8).map(|i| card(&format!("c{i}"))).collect();
        let mut engine = engine(MemoryStore::new(cards));
        let before = engine.store().clone();
        let request = engine.request(de(), Mode::Study);
        let mut session = engine.start(&request).unwrap();
        for _ in 0..5 {
            let card = session.current_card().cloned().unwrap();
            engine.record_known(&mut session, &card).unwrap();
        }
        engine.exit(&mut session).unwrap();
        for i in 0..8 {
            let id = CardId::new(format!("c{i}"));
            assert_eq!(engine.store().card(&id), before.card(&id));
        }
        assert!(engine.store().sessions().is_empty());
        assert!(matches!(
            engine.commit(&session),
            Err(SessionError::InvalidState(_))
        ));
    }

    #[test]
    fn test_recognition_increments_once() {
        let store = MemoryStore::new(vec![known(card("a"), 0)]);
        let mut engine = engine(store);
        let request = engine.request(de(), Mode::Recognition);
        let mut session = engine.start(&request).unwrap();
        let a = CardId::new("a");
        for _ in 0..3 {
            engine.record_unknown(&mut session, &a).unwrap();
        }
        assert_eq!(engine.record_known(&mut session, &a), Ok(Step::Completed));
        assert_eq!(session.round_number(), 4);
        assert_eq!(mastery(&engine, "a").recognition_level, 1);
        // Committing again changes nothing.
        engine.commit(&session).unwrap();
        assert_eq!(mastery(&engine, "a").recognition_level, 1);
        assert_eq!(engine.store().sessions().len(), 1);
    }

    #[test]
    fn test_freestyle_leaves_state_identical() {
        let cards: Vec<Card> = (0..10).map(|i| known(card(&format!("c{i}")), 2)).collect();
        let mut engine = engine(MemoryStore::new(cards));
        let before: Vec<String> = (0..10)
            .map(|i| {
                let card = engine.store().card(&CardId::new(format!("c{i}"))).unwrap();
                serde_json::to_string(card).unwrap()
            })
            .collect();
        let request = engine.request(de(), Mode::FreestyleReview);
        let mut session = engine.start(&request).unwrap();
        assert_eq!(session.original_cards().len(), 10);
        while let Some(card) = session.current_card().cloned() {
            engine.record_known(&mut session, &card).unwrap();
        }
        assert!(session.is_completed());
        let after: Vec<String> = (0..10)
            .map(|i| {
                let card = engine.store().card(&CardId::new(format!("c{i}"))).unwrap();
                serde_json::to_string(card).unwrap()
            })
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_empty_deck() {
        let mut engine = engine(MemoryStore::new(vec![known(card("a"), 0)]));
        let request = engine.request(de(), Mode::Study);
        assert_eq!(engine.start(&request).err(), Some(SessionError::EmptyDeck));
    }

    #[test]
    fn test_load_failure() {
        let mut engine = engine(BrokenStore);
        let request = engine.request(de(), Mode::Study);
        assert_eq!(
            engine.start(&request).err(),
            Some(SessionError::Load(ErrorReport::new("database is locked")))
        );
    }

    #[test]
    fn test_commit_failure_keeps_completion_and_retries() {
        let store = FlakyStore {
            inner: MemoryStore::new(vec![known(card("a"), 0)]),
            failures: 2,
        };
        let mut engine = engine(store);
        let request = engine.request(de(), Mode::Recognition);
        let mut session = engine.start(&request).unwrap();
        let a = CardId::new("a");
        let result = engine.record_known(&mut session, &a);
        assert!(matches!(result, Err(SessionError::Commit(_))));
        assert!(session.is_completed());
        assert!(matches!(
            engine.commit(&session),
            Err(SessionError::Commit(_))
        ));
        assert_eq!(engine.commit(&session), Ok(1));
        // At-least-once retries are safe.
        assert_eq!(engine.commit(&session), Ok(1));
        let state = engine.store().inner.card(&a).unwrap().mastery(&de());
        assert_eq!(state.recognition_level, 1);
        assert_eq!(engine.store().inner.sessions().len(), 1);
    }

    #[test]
    fn test_session_size_comes_from_config() {
        let cards: Vec<Card> = (0..50).map(|i| card(&format!("c{i}"))).collect();
        let mut engine = Engine::new(
            MemoryStore::new(cards),
            ManualClock::new(start_time()),
            TinyRng::from_seed(1),
            EngineConfig {
                session_size: 7,
                ..Default::default()
            },
        );
        let request = engine.request(de(), Mode::Study);
        let session = engine.start(&request).unwrap();
        assert_eq!(session.original_cards().len(), 7);
        assert_eq!(session.started_at(), start_time());
    }
}
