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

//! lexicards-core: the study session engine behind lexicards.
//!
//! This library provides:
//! - Deck selection for study, recognition and freestyle review sessions
//! - The session state machine with review rounds
//! - Committing a completed session's outcome into per-language mastery
//! - Card types and the TOML deck file parser

pub mod clock;
pub mod commit;
pub mod config;
pub mod deck;
pub mod engine;
pub mod error;
pub mod parser;
pub mod rng;
pub mod session;
pub mod store;
pub mod types;

// Re-exports for convenience
pub use clock::Clock;
pub use clock::ManualClock;
#[cfg(feature = "clock")]
pub use clock::SystemClock;
pub use commit::{CommitBatch, MasteryUpdate, apply_update, plan_commit};
pub use config::EngineConfig;
pub use deck::{Deck, DeckRequest, build_deck, mastered_pool};
pub use engine::Engine;
pub use error::{ErrorReport, Fallible, SessionError, fail};
pub use parser::{parse_deck_content, parse_decks};
pub use rng::{RandomSource, TinyRng, shuffle};
pub use session::{Session, SessionPolicy, SessionStatus, SessionSummary, Step};
pub use store::{CardStore, MemoryStore};
pub use types::card::{Card, CardId, Proficiency};
pub use types::language::Language;
pub use types::mastery::MasteryState;
pub use types::mode::Mode;
pub use types::session_id::SessionId;
pub use types::timestamp::Timestamp;
