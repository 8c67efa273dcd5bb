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
use std::collections::BTreeSet;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::types::aliases::CategoryId;
use crate::types::language::Language;
use crate::types::mastery::MasteryState;

/// Stable identifier of a card.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an id from the card's term, for deck entries that do not name
    /// one explicitly.
    pub fn from_term(term: &str) -> Self {
        let hash = blake3::hash(term.trim().as_bytes());
        Self(hash.to_hex()[..16].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CardId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CardId {
    fn from(value: &str) -> Self {
        CardId::new(value)
    }
}

/// CEFR proficiency tag, from beginner (A1) to advanced (C2).
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Proficiency {
    #[default]
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl Display for Proficiency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Proficiency::A1 => "A1",
            Proficiency::A2 => "A2",
            Proficiency::B1 => "B1",
            Proficiency::B2 => "B2",
            Proficiency::C1 => "C1",
            Proficiency::C2 => "C2",
        };
        write!(f, "{s}")
    }
}

/// A vocabulary item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    term: String,
    source_language: Option<Language>,
    translations: BTreeMap<Language, Vec<String>>,
    sentences: BTreeMap<Language, String>,
    image: Option<String>,
    level: Proficiency,
    categories: BTreeSet<CategoryId>,
    favorite: bool,
    mastery: BTreeMap<Language, MasteryState>,
}

impl Card {
    pub fn new(id: CardId, term: impl Into<String>) -> Self {
        Self {
            id,
            term: term.into(),
            source_language: None,
            translations: BTreeMap::new(),
            sentences: BTreeMap::new(),
            image: None,
            level: Proficiency::default(),
            categories: BTreeSet::new(),
            favorite: false,
            mastery: BTreeMap::new(),
        }
    }

    pub fn with_source_language(mut self, language: Language) -> Self {
        self.source_language = Some(language);
        self
    }

    pub fn with_translation(mut self, language: Language, text: impl Into<String>) -> Self {
        self.translations
            .entry(language)
            .or_default()
            .push(text.into());
        self
    }

    pub fn with_sentence(mut self, language: Language, sentence: impl Into<String>) -> Self {
        self.sentences.insert(language, sentence.into());
        self
    }

    pub fn with_image(mut self, path: impl Into<String>) -> Self {
        self.image = Some(path.into());
        self
    }

    pub fn with_level(mut self, level: Proficiency) -> Self {
        self.level = level;
        self
    }

    pub fn with_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.categories.insert(category.into());
        self
    }

    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    pub fn with_mastery(mut self, language: Language, state: MasteryState) -> Self {
        self.mastery.insert(language, state);
        self
    }

    pub fn id(&self) -> &CardId {
        &self.id
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn source_language(&self) -> Option<&Language> {
        self.source_language.as_ref()
    }

    pub fn translations(&self, language: &Language) -> &[String] {
        self.translations
            .get(language)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_translation(&self, language: &Language) -> bool {
        !self.translations(language).is_empty()
    }

    pub fn languages(&self) -> impl Iterator<Item = &Language> {
        self.translations.keys()
    }

    pub fn sentence(&self, language: &Language) -> Option<&str> {
        self.sentences.get(language).map(|s| s.as_str())
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn level(&self) -> Proficiency {
        self.level
    }

    pub fn categories(&self) -> &BTreeSet<CategoryId> {
        &self.categories
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    pub fn is_favorite(&self) -> bool {
        self.favorite
    }

    /// The mastery state for a language. Languages never reviewed report the
    /// default state.
    pub fn mastery(&self, language: &Language) -> MasteryState {
        self.mastery.get(language).copied().unwrap_or_default()
    }

    pub fn set_mastery(&mut self, language: Language, state: MasteryState) {
        self.mastery.insert(language, state);
    }
}
