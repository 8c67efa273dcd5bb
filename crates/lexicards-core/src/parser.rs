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

//! Reading vocabulary deck files.
//!
//! A deck file is TOML:
//!
//! ```toml
//! category = "animals"
//! source_language = "en"
//!
//! [[cards]]
//! term = "dog"
//! level = "a1"
//! translations = { de = ["Hund"], fr = "chien" }
//! sentences = { en = "The *dog* barks.", de = "Der *Hund* bellt." }
//! ```

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;

use crate::error::Fallible;
use crate::types::aliases::CategoryId;
use crate::types::card::Card;
use crate::types::card::CardId;
use crate::types::card::Proficiency;
use crate::types::language::Language;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DeckFile {
    category: Option<CategoryId>,
    source_language: Option<Language>,
    #[serde(default)]
    cards: Vec<CardEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CardEntry {
    id: Option<String>,
    term: String,
    #[serde(default)]
    level: Proficiency,
    #[serde(default)]
    favorite: bool,
    #[serde(default)]
    categories: Vec<CategoryId>,
    image: Option<String>,
    #[serde(default)]
    translations: BTreeMap<Language, Translations>,
    #[serde(default)]
    sentences: BTreeMap<Language, String>,
}

/// A translation may be written as a single string or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Translations {
    One(String),
    Many(Vec<String>),
}

impl Translations {
    fn into_vec(self) -> Vec<String> {
        match self {
            Translations::One(s) => vec![s],
            Translations::Many(v) => v,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct ParserError {
    message: String,
    file_name: String,
}

impl ParserError {
    fn new(message: impl Into<String>, file_name: &str) -> Self {
        ParserError {
            message: message.into(),
            file_name: file_name.to_string(),
        }
    }
}

impl Display for ParserError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.file_name, self.message)
    }
}

impl Error for ParserError {}

/// Parse a single deck file. `category` is used when the file does not
/// name its own.
pub fn parse_deck_content(
    category: &str,
    source_path: &str,
    text: &str,
) -> Result<Vec<Card>, ParserError> {
    let file: DeckFile = toml::from_str(text)
        .map_err(|e| ParserError::new(format!("invalid TOML: {}", e.message()), source_path))?;
    let category: CategoryId = file.category.unwrap_or_else(|| category.to_string());
    let mut cards = Vec::with_capacity(file.cards.len());
    for (idx, entry) in file.cards.into_iter().enumerate() {
        let term = entry.term.trim().to_string();
        if term.is_empty() {
            return Err(ParserError::new(
                format!("card #{} has an empty term", idx + 1),
                source_path,
            ));
        }
        let id = match entry.id {
            Some(id) if id.trim().is_empty() => {
                return Err(ParserError::new(
                    format!("card '{term}' has an empty id"),
                    source_path,
                ));
            }
            Some(id) => CardId::new(id.trim()),
            None => CardId::from_term(&term),
        };
        let mut card = Card::new(id, term)
            .with_level(entry.level)
            .with_favorite(entry.favorite)
            .with_category(category.clone());
        if let Some(lang) = &file.source_language {
            card = card.with_source_language(lang.clone());
        }
        for extra in entry.categories {
            card = card.with_category(extra);
        }
        if let Some(image) = entry.image {
            card = card.with_image(image);
        }
        for (lang, translations) in entry.translations {
            for text in translations.into_vec() {
                let text = text.trim();
                if !text.is_empty() {
                    card = card.with_translation(lang.clone(), text);
                }
            }
        }
        for (lang, sentence) in entry.sentences {
            card = card.with_sentence(lang, sentence);
        }
        cards.push(card);
    }
    Ok(cards)
}

/// Parse multiple deck files into one collection.
///
/// # Arguments
/// * `files` - Iterator of (filename, content) pairs
pub fn parse_decks<'a>(files: impl Iterator<Item = (&'a str, &'a str)>) -> Fallible<Vec<Card>> {
    let mut all_cards = Vec::new();
    let mut seen: HashSet<CardId> = HashSet::new();
    for (filename, text) in files {
        let stem = filename.rsplit('/').next().unwrap_or(filename);
        let category = stem.strip_suffix(".toml").unwrap_or(stem);
        let cards = parse_deck_content(category, filename, text)?;
        for card in cards {
            if !seen.insert(card.id().clone()) {
                return Err(ParserError::new(
                    format!("duplicate card id '{}'", card.id()),
                    filename,
                )
                .into());
            }
            all_cards.push(card);
        }
    }
    // Sorted by id to make subsequent code more deterministic.
    all_cards.sort_by(|a, b| a.id().cmp(b.id()));
    Ok(all_cards)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANIMALS: &str = r#"
source_language = "en"

[[cards]]
id = "dog"
term = "dog"
level = "a1"
favorite = true
categories = ["pets"]
image = "img/dog.png"
translations = { de = ["Hund", " "], FR = "chien" }
sentences = { en = "The *dog* barks." }

[[cards]]
term = "  wolf "
translations = { de = "Wolf" }
"#;

    #[test]
    fn test_parse_deck() -> Fallible<()> {
        let cards = parse_deck_content("animals", "animals.toml", ANIMALS)?;
        assert_eq!(cards.len(), 2);
        let dog = &cards[0];
        assert_eq!(dog.id(), &CardId::new("dog"));
        assert_eq!(dog.level(), Proficiency::A1);
        assert!(dog.is_favorite());
        assert!(dog.in_category("animals"));
        assert!(dog.in_category("pets"));
        assert_eq!(dog.image(), Some("img/dog.png"));
        assert_eq!(dog.translations(&Language::new("de")), ["Hund"]);
        assert_eq!(dog.translations(&Language::new("fr")), ["chien"]);
        assert_eq!(dog.sentence(&Language::new("en")), Some("The *dog* barks."));
        assert_eq!(dog.source_language(), Some(&Language::new("en")));

        let wolf = &cards[1];
        assert_eq!(wolf.term(), "wolf");
        assert_eq!(wolf.id(), &CardId::from_term("wolf"));
        assert!(!wolf.is_favorite());
        Ok(())
    }

    #[test]
    fn test_file_category_overrides_name() -> Fallible<()> {
        let text = "category = \"zoo\"\n[[cards]]\nterm = \"cat\"\n";
        let cards = parse_deck_content("animals", "animals.toml", text)?;
        assert!(cards[0].in_category("zoo"));
        assert!(!cards[0].in_category("animals"));
        Ok(())
    }

    #[test]
    fn test_empty_term() {
        let text = "[[cards]]\nterm = \"  \"\n";
        let err = parse_deck_content("x", "x.toml", text).unwrap_err();
        assert_eq!(err.to_string(), "x.toml: card #1 has an empty term");
    }

    #[test]
    fn test_unknown_field() {
        let text = "[[cards]]\nterm = \"cat\"\ncolour = \"black\"\n";
        assert!(parse_deck_content("x", "x.toml", text).is_err());
    }

    #[test]
    fn test_parse_decks_categories_from_file_names() -> Fallible<()> {
        let files = vec![
            ("decks/food.toml", "[[cards]]\nid = \"bread\"\nterm = \"bread\"\n"),
            ("verbs.toml", "[[cards]]\nid = \"eat\"\nterm = \"to eat\"\n"),
        ];
        let cards = parse_decks(files.into_iter())?;
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].id(), &CardId::new("bread"));
        assert!(cards[0].in_category("food"));
        assert!(cards[1].in_category("verbs"));
        Ok(())
    }

    #[test]
    fn test_duplicate_ids() {
        let files = vec![
            ("a.toml", "[[cards]]\nid = \"x\"\nterm = \"one\"\n"),
            ("b.toml", "[[cards]]\nid = \"x\"\nterm = \"two\"\n"),
        ];
        let err = parse_decks(files.into_iter()).unwrap_err();
        assert_eq!(err.message(), "Parse error: b.toml: duplicate card id 'x'");
    }
}
