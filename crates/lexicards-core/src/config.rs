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

/// Cards drawn into a study or recognition session.
pub const DEFAULT_SESSION_SIZE: usize = 30;

/// Cards at or above this level are not re-queued after a failure.
pub const DEFAULT_MASTERY_CEILING: u32 = 3;

/// Review rounds after which a session is abandoned.
pub const DEFAULT_MAX_ROUNDS: usize = 10_000;

/// Tunable engine parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EngineConfig {
    pub session_size: usize,
    pub mastery_ceiling: u32,
    pub max_rounds: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_size: DEFAULT_SESSION_SIZE,
            mastery_ceiling: DEFAULT_MASTERY_CEILING,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}
