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

use chrono::Duration;
use chrono::NaiveDateTime;
use chrono::SubsecRound;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ErrorReport;

const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// A wall-clock timestamp without a timezone, at millisecond precision.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    pub fn new(ndt: NaiveDateTime) -> Self {
        Self(ndt.trunc_subsecs(3))
    }

    pub fn into_inner(self) -> NaiveDateTime {
        self.0
    }

    /// The current timestamp in the user's local time.
    #[cfg(feature = "clock")]
    pub fn now() -> Self {
        Self::new(chrono::Local::now().naive_local())
    }

    pub fn plus_millis(self, millis: i64) -> Self {
        Self(self.0 + Duration::milliseconds(millis))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl TryFrom<String> for Timestamp {
    type Error = ErrorReport;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Timestamp::try_from(value.as_str())
    }
}

impl TryFrom<&str> for Timestamp {
    type Error = ErrorReport;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let ndt = NaiveDateTime::parse_from_str(value, FORMAT)
            .map_err(|_| ErrorReport::new(format!("Failed to parse timestamp: '{value}'.")))?;
        Ok(Timestamp(ndt))
    }
}

impl From<Timestamp> for String {
    fn from(ts: Timestamp) -> String {
        ts.to_string()
    }
}
