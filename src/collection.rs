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

use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use lexicards_core::Card;
use lexicards_core::CardStore;
use lexicards_core::CommitBatch;
use lexicards_core::Language;
use lexicards_core::parse_decks;
use walkdir::WalkDir;

use crate::config::CONFIG_FILE;
use crate::config::Config;
use crate::db::Database;
use crate::error::Fallible;
use crate::error::fail;

pub const DB_FILE: &str = "lexicards.db";

/// A collection directory: deck files, configuration and the mastery
/// database.
pub struct Collection {
    pub directory: PathBuf,
    pub config: Config,
    pub db: Database,
    pub cards: Vec<Card>,
}

impl Collection {
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()?,
        };
        if !directory.exists() {
            return fail("directory does not exist.");
        }
        let directory = directory.canonicalize()?;
        let config = Config::load(&directory)?;
        let db = Database::new(&directory.join(DB_FILE))?;
        let cards = load_cards(&directory)?;
        log::debug!(
            "Loaded {} cards from {}",
            cards.len(),
            directory.display()
        );
        Ok(Self {
            directory,
            config,
            db,
            cards,
        })
    }

    pub fn into_store(self) -> CollectionStore {
        CollectionStore {
            cards: self.cards,
            db: self.db,
        }
    }
}

/// Read every deck file under the collection root.
fn load_cards(directory: &Path) -> Fallible<Vec<Card>> {
    let mut files: Vec<(String, String)> = Vec::new();
    for entry in WalkDir::new(directory).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() {
            continue;
        }
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            continue;
        }
        let relative = path
            .strip_prefix(directory)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        if relative == CONFIG_FILE {
            continue;
        }
        files.push((relative, read_to_string(path)?));
    }
    let cards = parse_decks(
        files
            .iter()
            .map(|(name, text)| (name.as_str(), text.as_str())),
    )?;
    Ok(cards)
}

/// Parsed cards joined with the mastery database.
pub struct CollectionStore {
    cards: Vec<Card>,
    db: Database,
}

impl CollectionStore {
    pub fn db(&self) -> &Database {
        &self.db
    }
}

impl CardStore for CollectionStore {
    fn cards(&self, language: &Language) -> lexicards_core::Fallible<Vec<Card>> {
        let mastery = self.db.mastery(language)?;
        Ok(self
            .cards
            .iter()
            .filter(|card| card.has_translation(language))
            .map(|card| {
                let mut card = card.clone();
                if let Some(state) = mastery.get(card.id()) {
                    card.set_mastery(language.clone(), *state);
                }
                card
            })
            .collect())
    }

    fn apply_mastery_updates(&mut self, batch: &CommitBatch) -> lexicards_core::Fallible<()> {
        self.db.apply_batch(batch)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs::create_dir_all;
    use std::fs::write;

    use lexicards_core::CardId;
    use lexicards_core::Deck;
    use lexicards_core::Mode;
    use lexicards_core::Session;
    use lexicards_core::SessionPolicy;
    use lexicards_core::Timestamp;
    use lexicards_core::plan_commit;

    use super::*;
    use crate::helper::create_tmp_collection;
    use crate::helper::create_tmp_directory;

    #[test]
    fn test_non_existent_directory() {
        let result = Collection::new(Some("./derpherp".to_string()));
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("error: directory does not exist.".to_string())
        );
    }

    #[test]
    fn test_load_collection() -> Fallible<()> {
        let dir = create_tmp_collection()?;
        let collection = Collection::new(Some(dir))?;
        assert_eq!(collection.cards.len(), 2);
        assert_eq!(
            collection.config.default_language,
            Some(Language::new("de"))
        );
        assert!(collection.cards.iter().all(|c| c.in_category("animals")));
        Ok(())
    }

    #[test]
    fn test_nested_deck_files() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        create_dir_all(dir.join("food"))?;
        write(
            dir.join("food/fruit.toml"),
            "[[cards]]\nid = \"apple\"\nterm = \"apple\"\ntranslations = { de = \"Apfel\" }\n",
        )?;
        write(dir.join("notes.txt"), "not a deck")?;
        let collection = Collection::new(Some(dir.display().to_string()))?;
        assert_eq!(collection.cards.len(), 1);
        assert!(collection.cards[0].in_category("fruit"));
        Ok(())
    }

    #[test]
    fn test_store_joins_mastery() -> Fallible<()> {
        let dir = create_tmp_collection()?;
        let mut store = Collection::new(Some(dir.clone()))?.into_store();
        let de = Language::new("de");
        assert_eq!(store.cards(&de)?.len(), 2);
        assert!(store.cards(&Language::new("ja"))?.is_empty());

        let start = Timestamp::try_from("2024-06-01T08:00:00.000")?;
        let deck = Deck::new(de.clone(), Mode::Study, vec![CardId::new("dog")]);
        let mut session = Session::start(deck, start, SessionPolicy::default())?;
        session.record_known(&CardId::new("dog"), start.plus_millis(500))?;
        store.apply_mastery_updates(&plan_commit(&session)?)?;

        // Reopen from disk.
        let store = Collection::new(Some(dir))?.into_store();
        let cards = store.cards(&de)?;
        let dog = cards.iter().find(|c| c.id().as_str() == "dog").unwrap();
        let cat = cards.iter().find(|c| c.id().as_str() == "cat").unwrap();
        assert_eq!(dog.mastery(&de).study_level, 1);
        assert_eq!(cat.mastery(&de).study_level, 0);
        assert_eq!(store.db().sessions()?.len(), 1);
        Ok(())
    }
}
