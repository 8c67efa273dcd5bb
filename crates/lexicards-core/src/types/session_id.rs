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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::types::card::CardId;
use crate::types::language::Language;
use crate::types::mode::Mode;
use crate::types::timestamp::Timestamp;

/// Identifies a study session. Derived from everything that defines the
/// session, so the same start parameters always yield the same id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId {
    #[serde(skip)]
    inner: blake3::Hash,
}

impl SessionId {
    pub fn derive(
        started_at: Timestamp,
        mode: Mode,
        language: &Language,
        cards: &[CardId],
    ) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(started_at.to_string().as_bytes());
        hasher.update(&[0]);
        hasher.update(mode.as_str().as_bytes());
        hasher.update(&[0]);
        hasher.update(language.as_str().as_bytes());
        for card in cards {
            hasher.update(&[0]);
            hasher.update(card.as_str().as_bytes());
        }
        Self {
            inner: hasher.finalize(),
        }
    }

    pub fn to_hex(self) -> String {
        self.inner.to_hex().to_string()
    }

    pub fn from_hex(s: &str) -> Fallible<Self> {
        let inner =
            blake3::Hash::from_hex(s).map_err(|_| ErrorReport::new("invalid session id"))?;
        Ok(Self { inner })
    }

    /// The first few hex digits, for log lines.
    pub fn short(self) -> String {
        self.to_hex()[..8].to_string()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl TryFrom<String> for SessionId {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SessionId::from_hex(&value)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> String {
        id.to_hex()
    }
}
