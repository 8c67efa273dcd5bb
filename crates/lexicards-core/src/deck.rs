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

//! Deck selection: which cards a new session is made of.

use std::collections::BTreeSet;
use std::collections::HashMap;

use crate::config::DEFAULT_SESSION_SIZE;
use crate::error::SessionError;
use crate::rng::RandomSource;
use crate::rng::shuffle;
use crate::types::aliases::CategoryId;
use crate::types::card::Card;
use crate::types::card::CardId;
use crate::types::language::Language;
use crate::types::mode::Mode;

/// What kind of session to build a deck for.
#[derive(Clone, Debug)]
pub struct DeckRequest {
    pub language: Language,
    pub mode: Mode,
    /// Only cards in this category are eligible.
    pub category: Option<CategoryId>,
    /// For freestyle review: the cards offered for re-exposure. Without a
    /// pool every card is offered.
    pub pool: Option<BTreeSet<CardId>>,
    pub session_size: usize,
}

impl DeckRequest {
    pub fn new(language: Language, mode: Mode) -> Self {
        Self {
            language,
            mode,
            category: None,
            pool: None,
            session_size: DEFAULT_SESSION_SIZE,
        }
    }

    pub fn with_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_pool(mut self, pool: BTreeSet<CardId>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn with_session_size(mut self, size: usize) -> Self {
        self.session_size = size;
        self
    }

    fn admits(&self, card: &Card) -> bool {
        if !card.has_translation(&self.language) {
            return false;
        }
        if let Some(category) = &self.category {
            if !card.in_category(category) {
                return false;
            }
        }
        let mastery = card.mastery(&self.language);
        match self.mode {
            Mode::Study => mastery.study_level == 0,
            Mode::Recognition => mastery.recognition_level == 0,
            Mode::FreestyleReview => match &self.pool {
                Some(pool) => pool.contains(card.id()),
                None => true,
            },
        }
    }
}

/// The ordered working set of a new session, along with each card's
/// pre-session level for the session's mode.
#[derive(Clone, Debug, PartialEq)]
pub struct Deck {
    language: Language,
    mode: Mode,
    cards: Vec<CardId>,
    levels: HashMap<CardId, u32>,
}

impl Deck {
    /// Build a deck from an explicit card order. Repeated ids are dropped.
    pub fn new(language: Language, mode: Mode, cards: Vec<CardId>) -> Self {
        let mut seen = BTreeSet::new();
        let cards = cards
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();
        Self {
            language,
            mode,
            cards,
            levels: HashMap::new(),
        }
    }

    pub fn with_level(mut self, card: CardId, level: u32) -> Self {
        self.levels.insert(card, level);
        self
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn card_ids(&self) -> &[CardId] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The card's level before the session, as compared against the mastery
    /// ceiling. `None` in freestyle review.
    pub fn level(&self, card: &CardId) -> Option<u32> {
        match self.mode {
            Mode::Study | Mode::Recognition => Some(self.levels.get(card).copied().unwrap_or(0)),
            Mode::FreestyleReview => None,
        }
    }

    pub(crate) fn into_parts(self) -> (Language, Mode, Vec<CardId>, HashMap<CardId, u32>) {
        (self.language, self.mode, self.cards, self.levels)
    }
}

/// Select, shuffle and bound the cards for a new session.
///
/// Fails with [`SessionError::EmptyDeck`] when nothing is eligible.
pub fn build_deck(
    cards: &[Card],
    request: &DeckRequest,
    rng: &mut impl RandomSource,
) -> Result<Deck, SessionError> {
    let mut eligible: Vec<&Card> = cards.iter().filter(|card| request.admits(card)).collect();
    // Sorting first makes the draw depend only on the seed, not on the
    // order the store returned the cards in.
    eligible.sort_by(|a, b| a.id().cmp(b.id()));
    eligible.dedup_by(|a, b| a.id() == b.id());
    let total = eligible.len();
    let mut drawn: Vec<&Card> = shuffle(eligible, rng);
    if request.mode.is_bounded() {
        drawn.truncate(request.session_size);
    }
    log::debug!(
        "Deck for {} in '{}': {total} eligible, {} drawn",
        request.mode,
        request.language,
        drawn.len()
    );
    if drawn.is_empty() {
        return Err(SessionError::EmptyDeck);
    }
    let mut deck = Deck::new(
        request.language.clone(),
        request.mode,
        drawn.iter().map(|card| card.id().clone()).collect(),
    );
    for card in drawn {
        if let Some(level) = card.mastery(&request.language).level_for(request.mode) {
            deck = deck.with_level(card.id().clone(), level);
        }
    }
    Ok(deck)
}

/// The conventional freestyle pool: cards of a category (or of the whole
/// collection) that have already been studied or recognized in a language.
pub fn mastered_pool(
    cards: &[Card],
    language: &Language,
    category: Option<&str>,
) -> BTreeSet<CardId> {
    cards
        .iter()
        .filter(|card| card.has_translation(language))
        .filter(|card| category.is_none_or(|c| card.in_category(c)))
        .filter(|card| !card.mastery(language).is_new())
        .map(|card| card.id().clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::TinyRng;
    use crate::types::mastery::MasteryState;

    fn de() -> Language {
        Language::new("de")
    }

    fn card(id: &str) -> Card {
        Card::new(CardId::new(id), id).with_translation(de(), format!("{id}-de"))
    }

    fn studied(card: Card) -> Card {
        card.with_mastery(
            de(),
            MasteryState {
                study_level: 1,
                ..Default::default()
            },
        )
    }

    fn recognized(card: Card, times: u32) -> Card {
        card.with_mastery(
            de(),
            MasteryState {
                study_level: 1,
                recognition_level: times,
                ..Default::default()
            },
        )
    }

    fn set(ids: &[&str]) -> BTreeSet<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn ids(deck: &Deck) -> BTreeSet<String> {
        deck.card_ids()
            .iter()
            .map(|id| id.as_str().to_string())
            .collect()
    }

    #[test]
    fn test_study_takes_unstudied_cards() {
        let cards = vec![card("a"), studied(card("b")), card("c")];
        let request = DeckRequest::new(de(), Mode::Study);
        let deck = build_deck(&cards, &request, &mut TinyRng::from_seed(1)).unwrap();
        assert_eq!(ids(&deck), set(&["a", "c"]));
        assert_eq!(deck.level(&CardId::new("a")), Some(0));
    }

    #[test]
    fn test_recognition_takes_unrecognized_cards() {
        let cards = vec![studied(card("a")), recognized(card("b"), 2), card("c")];
        let request = DeckRequest::new(de(), Mode::Recognition);
        let deck = build_deck(&cards, &request, &mut TinyRng::from_seed(1)).unwrap();
        assert_eq!(ids(&deck), set(&["a", "c"]));
    }

    #[test]
    fn test_cards_without_translation_are_skipped() {
        let cards = vec![
            card("a"),
            Card::new(CardId::new("b"), "b").with_translation(Language::new("fr"), "b-fr"),
        ];
        let request = DeckRequest::new(de(), Mode::Study);
        let deck = build_deck(&cards, &request, &mut TinyRng::from_seed(1)).unwrap();
        assert_eq!(ids(&deck), set(&["a"]));
    }

    #[test]
    fn test_category_filter() {
        let cards = vec![
            card("a").with_category("animals"),
            card("b").with_category("food"),
            card("c").with_category("animals").with_category("pets"),
        ];
        let request = DeckRequest::new(de(), Mode::Study).with_category("animals");
        let deck = build_deck(&cards, &request, &mut TinyRng::from_seed(1)).unwrap();
        assert_eq!(ids(&deck), set(&["a", "c"]));
    }

    #[test]
    fn test_bounded_modes_are_truncated() {
        let cards: Vec<Card> = (0..100).map(|i| card(&format!("c{i}"))).collect();
        let request = DeckRequest::new(de(), Mode::Study);
        let deck = build_deck(&cards, &request, &mut TinyRng::from_seed(9)).unwrap();
        assert_eq!(deck.len(), DEFAULT_SESSION_SIZE);
        let request = DeckRequest::new(de(), Mode::Recognition).with_session_size(5);
        let deck = build_deck(&cards, &request, &mut TinyRng::from_seed(9)).unwrap();
        assert_eq!(deck.len(), 5);
    }

    #[test]
    fn test_freestyle_is_not_truncated() {
        let cards: Vec<Card> = (0..100).map(|i| studied(card(&format!("c{i}")))).collect();
        let request = DeckRequest::new(de(), Mode::FreestyleReview);
        let deck = build_deck(&cards, &request, &mut TinyRng::from_seed(9)).unwrap();
        assert_eq!(deck.len(), 100);
        assert_eq!(deck.level(&CardId::new("c0")), None);
    }

    #[test]
    fn test_freestyle_uses_supplied_pool() {
        let cards = vec![studied(card("a")), studied(card("b")), card("c")];
        let pool = BTreeSet::from([CardId::new("b"), CardId::new("c")]);
        let request = DeckRequest::new(de(), Mode::FreestyleReview).with_pool(pool);
        let deck = build_deck(&cards, &request, &mut TinyRng::from_seed(1)).unwrap();
        assert_eq!(ids(&deck), set(&["b", "c"]));
    }

    #[test]
    fn test_mastered_pool() {
        let cards = vec![
            studied(card("a")).with_category("x"),
            card("b").with_category("x"),
            recognized(card("c"), 1).with_category("y"),
        ];
        let all = mastered_pool(&cards, &de(), None);
        assert_eq!(all, BTreeSet::from([CardId::new("a"), CardId::new("c")]));
        let x = mastered_pool(&cards, &de(), Some("x"));
        assert_eq!(x, BTreeSet::from([CardId::new("a")]));
    }

    #[test]
    fn test_empty_deck() {
        let cards = vec![studied(card("a"))];
        let request = DeckRequest::new(de(), Mode::Study);
        let result = build_deck(&cards, &request, &mut TinyRng::from_seed(1));
        assert_eq!(result, Err(SessionError::EmptyDeck));
        let result = build_deck(&[], &request, &mut TinyRng::from_seed(1));
        assert_eq!(result, Err(SessionError::EmptyDeck));
    }

    #[test]
    fn test_draw_depends_only_on_seed() {
        let cards: Vec<Card> = (0..40).map(|i| card(&format!("c{i}"))).collect();
        let mut reversed = cards.clone();
        reversed.reverse();
        let request = DeckRequest::new(de(), Mode::Study);
        let a = build_deck(&cards, &request, &mut TinyRng::from_seed(5)).unwrap();
        let b = build_deck(&reversed, &request, &mut TinyRng::from_seed(5)).unwrap();
        assert_eq!(a.card_ids(), b.card_ids());
    }

    #[test]
    fn test_deck_new_drops_repeats() {
        let deck = Deck::new(
            de(),
            Mode::Study,
            vec![CardId::new("a"), CardId::new("b"), CardId::new("a")],
        );
        assert_eq!(deck.card_ids(), [CardId::new("a"), CardId::new("b")]);
    }
}
