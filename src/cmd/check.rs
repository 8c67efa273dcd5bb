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

use std::collections::HashSet;

use lexicards_core::Card;
use lexicards_core::CardId;

use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;

/// Load a collection and report anything that would keep cards out of
/// sessions. Parse errors fail the command; the rest are warnings.
pub fn check_collection(directory: Option<String>) -> Fallible<()> {
    let collection = Collection::new(directory)?;
    let warnings = find_warnings(&collection.cards, &collection.db.card_ids()?);
    for warning in &warnings {
        println!("warning: {warning}");
    }
    println!(
        "{} cards, {} warnings.",
        collection.cards.len(),
        warnings.len()
    );
    if let Some(language) = &collection.config.default_language {
        if !collection.cards.iter().any(|c| c.has_translation(language)) {
            return fail(format!(
                "default language '{language}' has no translations in this collection."
            ));
        }
    }
    Ok(())
}

pub fn find_warnings(cards: &[Card], stored: &HashSet<CardId>) -> Vec<String> {
    let mut warnings = Vec::new();
    for card in cards {
        if card.languages().next().is_none() {
            warnings.push(format!("card '{}' has no translations.", card.id()));
        }
        if let Some(source) = card.source_language() {
            if card.has_translation(source) {
                warnings.push(format!(
                    "card '{}' is translated into its own source language '{source}'.",
                    card.id()
                ));
            }
        }
    }
    let known: HashSet<&CardId> = cards.iter().map(|card| card.id()).collect();
    let mut orphans: Vec<&CardId> = stored.iter().filter(|id| !known.contains(id)).collect();
    orphans.sort();
    for id in orphans {
        warnings.push(format!("mastery recorded for unknown card '{id}'."));
    }
    warnings
}

#[cfg(test)]
mod tests {
    use std::fs::write;
    use std::path::Path;

    use lexicards_core::Language;

    use super::*;
    use crate::helper::create_tmp_collection;

    #[test]
    fn test_clean_collection() -> Fallible<()> {
        let directory = create_tmp_collection()?;
        check_collection(Some(directory))?;
        Ok(())
    }

    #[test]
    fn test_default_language_without_translations() -> Fallible<()> {
        let directory = create_tmp_collection()?;
        write(
            Path::new(&directory).join("lexicards.toml"),
            "default_language = \"fr\"\n",
        )?;
        let result = check_collection(Some(directory));
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("error: default language 'fr' has no translations in this collection.".to_string())
        );
        Ok(())
    }

    #[test]
    fn test_warnings() {
        let en = Language::new("en");
        let cards = vec![
            Card::new(CardId::new("bare"), "bare"),
            Card::new(CardId::new("self"), "self")
                .with_source_language(en.clone())
                .with_translation(en, "self"),
            Card::new(CardId::new("fine"), "fine").with_translation(Language::new("de"), "gut"),
        ];
        let stored = HashSet::from([CardId::new("fine"), CardId::new("zzz"), CardId::new("old")]);
        assert_eq!(
            find_warnings(&cards, &stored),
            vec![
                "card 'bare' has no translations.".to_string(),
                "card 'self' is translated into its own source language 'en'.".to_string(),
                "mastery recorded for unknown card 'old'.".to_string(),
                "mastery recorded for unknown card 'zzz'.".to_string(),
            ]
        );
    }
}
