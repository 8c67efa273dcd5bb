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

use lexicards_core::Language;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;

/// Forget all study and recognition progress in one language.
pub fn reset_language(directory: Option<String>, language: Option<String>) -> Fallible<()> {
    let mut collection = Collection::new(directory)?;
    let language: Language = match (language, &collection.config.default_language) {
        (Some(language), _) => Language::new(&language),
        (None, Some(language)) => language.clone(),
        (None, None) => {
            return fail(
                "no language to reset: pass --language or set default_language in lexicards.toml.",
            );
        }
    };
    let removed = collection.db.reset_language(&language)?;
    log::info!("Removed {removed} mastery records for {language}");
    println!("Reset {removed} cards in '{language}'.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use lexicards_core::CardStore;
    use lexicards_core::DeckRequest;
    use lexicards_core::Mode;
    use lexicards_core::Session;
    use lexicards_core::SessionPolicy;
    use lexicards_core::Timestamp;
    use lexicards_core::TinyRng;
    use lexicards_core::build_deck;
    use lexicards_core::plan_commit;

    use super::*;
    use crate::collection::DB_FILE;
    use crate::db::Database;
    use crate::helper::create_tmp_collection;

    fn de() -> Language {
        Language::new("de")
    }

    fn study_everything(directory: &str) -> Fallible<()> {
        let mut store = Collection::new(Some(directory.to_string()))?.into_store();
        let cards = store.cards(&de())?;
        let deck = build_deck(
            &cards,
            &DeckRequest::new(de(), Mode::Study),
            &mut TinyRng::from_seed(1),
        )?;
        let start = Timestamp::try_from("2024-06-01T08:00:00.000")?;
        let mut session = Session::start(deck, start, SessionPolicy::default())?;
        while let Some(card) = session.current_card().cloned() {
            session.record_known(&card, start.plus_millis(1000))?;
        }
        store.apply_mastery_updates(&plan_commit(&session)?)?;
        Ok(())
    }

    #[test]
    fn test_reset_default_language() -> Fallible<()> {
        let directory = create_tmp_collection()?;
        study_everything(&directory)?;
        let db = Database::new(&PathBuf::from(&directory).join(DB_FILE))?;
        assert_eq!(db.mastery(&de())?.len(), 2);

        reset_language(Some(directory.clone()), None)?;
        assert!(db.mastery(&de())?.is_empty());
        assert_eq!(db.sessions()?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_reset_other_language_keeps_progress() -> Fallible<()> {
        let directory = create_tmp_collection()?;
        study_everything(&directory)?;
        reset_language(Some(directory.clone()), Some("fr".to_string()))?;
        let db = Database::new(&PathBuf::from(&directory).join(DB_FILE))?;
        assert_eq!(db.mastery(&de())?.len(), 2);
        Ok(())
    }
}
