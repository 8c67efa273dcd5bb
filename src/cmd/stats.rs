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
use std::collections::HashMap;
use std::fmt::Display;
use std::fmt::Formatter;

use clap::ValueEnum;
use lexicards_core::Card;
use lexicards_core::CardId;
use lexicards_core::Language;
use lexicards_core::MasteryState;
use lexicards_core::SessionSummary;
use lexicards_core::Timestamp;
use serde::Serialize;

use crate::collection::Collection;
use crate::error::Fallible;

/// How many of the latest sessions are listed.
const RECENT_SESSIONS: usize = 10;

#[derive(ValueEnum, Clone, Copy, PartialEq)]
pub enum StatsFormat {
    /// Human-readable summary.
    Text,
    /// Machine-readable JSON.
    Json,
}

impl Display for StatsFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StatsFormat::Text => write!(f, "text"),
            StatsFormat::Json => write!(f, "json"),
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
pub struct Stats {
    pub cards: usize,
    pub languages: Vec<LanguageStats>,
    pub sessions: usize,
    pub recent_sessions: Vec<SessionSummary>,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct LanguageStats {
    pub language: Language,
    /// Cards with at least one translation in this language.
    pub cards: usize,
    pub studied: usize,
    pub recognized: usize,
    /// Passed recognition sessions, summed over all cards.
    pub recognition_passes: u32,
    pub last_reviewed_at: Option<Timestamp>,
}

pub fn print_stats(directory: Option<String>, format: StatsFormat) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let mut mastery: HashMap<(CardId, Language), MasteryState> = HashMap::new();
    for (card_id, language, state) in collection.db.all_mastery()? {
        mastery.insert((card_id, language), state);
    }
    let sessions = collection.db.sessions()?;
    let stats = compute_stats(&collection.cards, &mastery, sessions);
    match format {
        StatsFormat::Text => print!("{}", render_text(&stats)),
        StatsFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
    }
    Ok(())
}

pub fn compute_stats(
    cards: &[Card],
    mastery: &HashMap<(CardId, Language), MasteryState>,
    sessions: Vec<SessionSummary>,
) -> Stats {
    let mut languages: BTreeMap<Language, LanguageStats> = BTreeMap::new();
    for card in cards {
        for language in card.languages() {
            let entry = languages
                .entry(language.clone())
                .or_insert_with(|| LanguageStats {
                    language: language.clone(),
                    cards: 0,
                    studied: 0,
                    recognized: 0,
                    recognition_passes: 0,
                    last_reviewed_at: None,
                });
            entry.cards += 1;
            let Some(state) = mastery.get(&(card.id().clone(), language.clone())) else {
                continue;
            };
            if state.study_level > 0 {
                entry.studied += 1;
            }
            if state.recognition_level > 0 {
                entry.recognized += 1;
            }
            entry.recognition_passes += state.recognition_level;
            entry.last_reviewed_at = entry.last_reviewed_at.max(state.last_reviewed_at);
        }
    }
    let total_sessions = sessions.len();
    let recent_sessions = sessions
        .into_iter()
        .rev()
        .take(RECENT_SESSIONS)
        .collect();
    Stats {
        cards: cards.len(),
        languages: languages.into_values().collect(),
        sessions: total_sessions,
        recent_sessions,
    }
}

fn render_text(stats: &Stats) -> String {
    let mut out = String::new();
    out.push_str(&format!("Cards: {}\n", stats.cards));
    for language in &stats.languages {
        out.push_str(&format!(
            "[{}] {} cards, {} studied, {} recognized ({} passes)",
            language.language,
            language.cards,
            language.studied,
            language.recognized,
            language.recognition_passes
        ));
        if let Some(at) = language.last_reviewed_at {
            out.push_str(&format!(", last review {at}"));
        }
        out.push('\n');
    }
    out.push_str(&format!("Sessions: {}\n", stats.sessions));
    for session in &stats.recent_sessions {
        out.push_str(&format!(
            "  {} {} {} [{}]: {} cards, {} rounds, {} answers\n",
            session.completed_at,
            session.mode,
            session.language,
            session.id.short(),
            session.cards,
            session.rounds,
            session.attempts
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helper::create_tmp_collection;

    fn de() -> Language {
        Language::new("de")
    }

    fn card(id: &str) -> Card {
        Card::new(CardId::new(id), id).with_translation(de(), format!("{id}-de"))
    }

    fn at(s: &str) -> Timestamp {
        Timestamp::try_from(s).unwrap()
    }

    #[test]
    fn test_empty_stats() {
        let stats = compute_stats(&[], &HashMap::new(), Vec::new());
        assert_eq!(stats.cards, 0);
        assert!(stats.languages.is_empty());
        assert_eq!(render_text(&stats), "Cards: 0\nSessions: 0\n");
    }

    #[test]
    fn test_counts_per_language() {
        let cards = vec![
            card("a"),
            card("b").with_translation(Language::new("fr"), "b-fr"),
            card("c"),
        ];
        let mut mastery = HashMap::new();
        mastery.insert(
            (CardId::new("a"), de()),
            MasteryState {
                study_level: 1,
                recognition_level: 2,
                last_reviewed_at: Some(at("2024-01-02T00:00:00.000")),
                committed_session: None,
            },
        );
        mastery.insert(
            (CardId::new("b"), de()),
            MasteryState {
                study_level: 1,
                recognition_level: 0,
                last_reviewed_at: Some(at("2024-01-03T00:00:00.000")),
                committed_session: None,
            },
        );
        // Orphaned state is not counted.
        mastery.insert(
            (CardId::new("gone"), de()),
            MasteryState {
                study_level: 1,
                ..Default::default()
            },
        );
        let stats = compute_stats(&cards, &mastery, Vec::new());
        assert_eq!(stats.cards, 3);
        assert_eq!(
            stats.languages,
            vec![
                LanguageStats {
                    language: de(),
                    cards: 3,
                    studied: 2,
                    recognized: 1,
                    recognition_passes: 2,
                    last_reviewed_at: Some(at("2024-01-03T00:00:00.000")),
                },
                LanguageStats {
                    language: Language::new("fr"),
                    cards: 1,
                    studied: 0,
                    recognized: 0,
                    recognition_passes: 0,
                    last_reviewed_at: None,
                },
            ]
        );
    }

    #[test]
    fn test_print_stats() -> Fallible<()> {
        let directory = create_tmp_collection()?;
        print_stats(Some(directory.clone()), StatsFormat::Text)?;
        print_stats(Some(directory), StatsFormat::Json)?;
        Ok(())
    }
}
