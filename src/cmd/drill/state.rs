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

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use lexicards_core::Card;
use lexicards_core::CardId;
use lexicards_core::Engine;
use lexicards_core::Language;
use lexicards_core::Session;
use lexicards_core::SystemClock;
use lexicards_core::TinyRng;
use tokio::sync::oneshot::Sender;

use crate::collection::CollectionStore;

pub type DrillEngine = Engine<CollectionStore, SystemClock, TinyRng>;

#[derive(Clone)]
pub struct ServerState {
    pub directory: PathBuf,
    pub language: Language,
    /// Cards of the session, for rendering.
    pub cards: Arc<HashMap<CardId, Card>>,
    pub mutable: Arc<Mutex<MutableState>>,
    pub shutdown_tx: Arc<Mutex<Option<Sender<()>>>>,
}

pub struct MutableState {
    pub reveal: bool,
    pub engine: DrillEngine,
    pub session: Session,
    /// Set when the completed session could not be written to the database.
    pub commit_error: Option<String>,
}
