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

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;

use lexicards_core::CardId;
use lexicards_core::CommitBatch;
use lexicards_core::Language;
use lexicards_core::MasteryState;
use lexicards_core::Mode;
use lexicards_core::SessionId;
use lexicards_core::SessionSummary;
use lexicards_core::Timestamp;
use lexicards_core::apply_update;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::params;

use crate::error::Fallible;

const SCHEMA: &str = "
create table if not exists mastery (
    card_id text not null,
    language text not null,
    study_level integer not null default 0,
    recognition_level integer not null default 0,
    last_reviewed_at text,
    committed_session text,
    primary key (card_id, language)
) strict;

create table if not exists sessions (
    session_id text primary key,
    mode text not null,
    language text not null,
    started_at text not null,
    completed_at text not null,
    rounds integer not null,
    cards integer not null,
    known integer not null,
    attempts integer not null
) strict;
";

/// The mastery database of a collection.
pub struct Database {
    conn: Connection,
}

/// A mastery row before its text columns are parsed.
struct MasteryRow {
    card_id: String,
    language: String,
    study_level: u32,
    recognition_level: u32,
    last_reviewed_at: Option<String>,
    committed_session: Option<String>,
}

impl MasteryRow {
    const COLUMNS: &'static str = "card_id, language, study_level, recognition_level, last_reviewed_at, committed_session";

    fn read(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            card_id: row.get(0)?,
            language: row.get(1)?,
            study_level: row.get(2)?,
            recognition_level: row.get(3)?,
            last_reviewed_at: row.get(4)?,
            committed_session: row.get(5)?,
        })
    }

    fn into_state(self) -> Fallible<(CardId, Language, MasteryState)> {
        let last_reviewed_at = match self.last_reviewed_at {
            Some(ts) => Some(Timestamp::try_from(ts)?),
            None => None,
        };
        let committed_session = match self.committed_session {
            Some(id) => Some(SessionId::from_hex(&id)?),
            None => None,
        };
        let state = MasteryState {
            study_level: self.study_level,
            recognition_level: self.recognition_level,
            last_reviewed_at,
            committed_session,
        };
        Ok((CardId::new(self.card_id), Language::new(&self.language), state))
    }
}

impl Database {
    pub fn new(path: &Path) -> Fallible<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    #[cfg(test)]
    pub fn in_memory() -> Fallible<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Fallible<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Mastery of every card that has any recorded state in `language`.
    pub fn mastery(&self, language: &Language) -> Fallible<HashMap<CardId, MasteryState>> {
        let sql = format!(
            "select {} from mastery where language = ?1",
            MasteryRow::COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![language.as_str()], MasteryRow::read)?;
        let mut result = HashMap::new();
        for row in rows {
            let (card_id, _, state) = row?.into_state()?;
            result.insert(card_id, state);
        }
        Ok(result)
    }

    /// Every mastery record, in all languages.
    pub fn all_mastery(&self) -> Fallible<Vec<(CardId, Language, MasteryState)>> {
        let sql = format!(
            "select {} from mastery order by language, card_id",
            MasteryRow::COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], MasteryRow::read)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?.into_state()?);
        }
        Ok(result)
    }

    /// Ids of all cards that have mastery records.
    pub fn card_ids(&self) -> Fallible<HashSet<CardId>> {
        let mut stmt = self.conn.prepare("select distinct card_id from mastery")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut result = HashSet::new();
        for row in rows {
            result.insert(CardId::new(row?));
        }
        Ok(result)
    }

    /// Apply a completed session's batch in a single transaction.
    pub fn apply_batch(&mut self, batch: &CommitBatch) -> Fallible<()> {
        let tx = self.conn.transaction()?;
        let select = format!(
            "select {} from mastery where card_id = ?1 and language = ?2",
            MasteryRow::COLUMNS
        );
        for update in &batch.updates {
            let row: Option<MasteryRow> = tx
                .query_row(
                    &select,
                    params![update.card_id.as_str(), update.language.as_str()],
                    MasteryRow::read,
                )
                .optional()?;
            let mut state = match row {
                Some(row) => row.into_state()?.2,
                None => MasteryState::default(),
            };
            if apply_update(&mut state, update) {
                tx.execute(
                    "insert into mastery (card_id, language, study_level, recognition_level, last_reviewed_at, committed_session)
                     values (?1, ?2, ?3, ?4, ?5, ?6)
                     on conflict (card_id, language) do update set
                        study_level = excluded.study_level,
                        recognition_level = excluded.recognition_level,
                        last_reviewed_at = excluded.last_reviewed_at,
                        committed_session = excluded.committed_session",
                    params![
                        update.card_id.as_str(),
                        update.language.as_str(),
                        state.study_level,
                        state.recognition_level,
                        state.last_reviewed_at.map(String::from),
                        state.committed_session.map(String::from),
                    ],
                )?;
            }
        }
        let summary = &batch.summary;
        tx.execute(
            "insert or ignore into sessions (session_id, mode, language, started_at, completed_at, rounds, cards, known, attempts)
             values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                summary.id.to_hex(),
                summary.mode.as_str(),
                summary.language.as_str(),
                summary.started_at.to_string(),
                summary.completed_at.to_string(),
                summary.rounds,
                summary.cards,
                summary.known,
                summary.attempts,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Completed sessions, oldest first.
    pub fn sessions(&self) -> Fallible<Vec<SessionSummary>> {
        let mut stmt = self.conn.prepare(
            "select session_id, mode, language, started_at, completed_at, rounds, cards, known, attempts
             from sessions order by completed_at",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, usize>(5)?,
                row.get::<_, usize>(6)?,
                row.get::<_, usize>(7)?,
                row.get::<_, usize>(8)?,
            ))
        })?;
        let mut result = Vec::new();
        for row in rows {
            let (id, mode, language, started_at, completed_at, rounds, cards, known, attempts) =
                row?;
            result.push(SessionSummary {
                id: SessionId::from_hex(&id)?,
                mode: mode.parse::<Mode>()?,
                language: Language::new(&language),
                started_at: Timestamp::try_from(started_at)?,
                completed_at: Timestamp::try_from(completed_at)?,
                rounds,
                cards,
                known,
                attempts,
            });
        }
        Ok(result)
    }

    /// Forget all mastery in a language. Returns the number of records
    /// removed. Session history is kept.
    pub fn reset_language(&mut self, language: &Language) -> Fallible<usize> {
        let removed = self.conn.execute(
            "delete from mastery where language = ?1",
            params![language.as_str()],
        )?;
        Ok(removed)
    }
}
