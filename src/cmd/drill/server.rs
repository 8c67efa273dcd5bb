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
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use axum::Router;
use axum::extract::Path;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use lexicards_core::Card;
use lexicards_core::CardId;
use lexicards_core::CardStore;
use lexicards_core::Engine;
use lexicards_core::Language;
use lexicards_core::Mode;
use lexicards_core::SessionError;
use lexicards_core::SystemClock;
use lexicards_core::TinyRng;
use lexicards_core::mastered_pool;
use tokio::net::TcpListener;
use tokio::select;
use tokio::signal;
use tokio::sync::oneshot::Receiver;
use tokio::sync::oneshot::channel;

use crate::cmd::drill::get::get_handler;
use crate::cmd::drill::post::post_handler;
use crate::cmd::drill::state::MutableState;
use crate::cmd::drill::state::ServerState;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::error::fail;
use crate::media::load::ImageLoader;
use crate::media::load::content_type;
use crate::utils::CACHE_CONTROL_IMMUTABLE;

pub struct ServerConfig {
    pub directory: Option<String>,
    pub host: String,
    pub port: u16,
    /// Target language. Falls back to `default_language` in the collection
    /// configuration.
    pub language: Option<String>,
    pub mode: Mode,
    pub category: Option<String>,
    pub session_size: Option<usize>,
    /// Shuffle seed. By default, the current time is used.
    pub seed: Option<u64>,
}

pub async fn start_server(config: ServerConfig) -> Fallible<()> {
    let collection = Collection::new(config.directory)?;
    let directory = collection.directory.clone();

    let language: Language = match (config.language, &collection.config.default_language) {
        (Some(language), _) => Language::new(&language),
        (None, Some(language)) => language.clone(),
        (None, None) => {
            return fail(
                "no target language: pass --language or set default_language in lexicards.toml.",
            );
        }
    };

    let mut engine_config = collection.config.engine();
    if let Some(size) = config.session_size {
        if size == 0 {
            return fail("session_size must be at least 1.");
        }
        engine_config.session_size = size;
    }

    let store = collection.into_store();
    let snapshot: Vec<Card> = store.cards(&language)?;

    let seed = match config.seed {
        Some(seed) => seed,
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default(),
    };
    let mut engine = Engine::new(store, SystemClock, TinyRng::from_seed(seed), engine_config);

    let mut request = engine.request(language.clone(), config.mode);
    if let Some(category) = &config.category {
        request = request.with_category(category.clone());
    }
    if config.mode == Mode::FreestyleReview {
        let pool = mastered_pool(&snapshot, &language, config.category.as_deref());
        request = request.with_pool(pool);
    }

    let session = match engine.start(&request) {
        Ok(session) => session,
        Err(SessionError::EmptyDeck) => {
            println!("Nothing to study.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    log::info!(
        "Drilling {} {} cards in {} mode",
        session.original_cards().len(),
        language,
        config.mode.as_str()
    );

    let cards: HashMap<CardId, Card> = snapshot
        .into_iter()
        .filter(|card| session.original_cards().contains(card.id()))
        .map(|card| (card.id().clone(), card))
        .collect();

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = channel();

    let state = ServerState {
        directory,
        language,
        cards: Arc::new(cards),
        mutable: Arc::new(Mutex::new(MutableState {
            reveal: false,
            engine,
            session,
            commit_error: None,
        })),
        shutdown_tx: Arc::new(Mutex::new(Some(shutdown_tx))),
    };
    let app = Router::new();
    let app = app.route("/", get(get_handler));
    let app = app.route("/", post(post_handler));
    let app = app.route("/script.js", get(script_handler));
    let app = app.route("/style.css", get(style_handler));
    let app = app.route("/image/{*path}", get(image_handler));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state.clone());
    let bind = format!("{}:{}", config.host, config.port);

    // Start the server with graceful shutdown on Ctrl+C or shutdown button.
    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await?;

    let mutable = match state.mutable.lock() {
        Ok(mutable) => mutable,
        Err(_) => return fail("session state was poisoned"),
    };
    if let Some(error) = &mutable.commit_error {
        return fail(format!("Session progress was not saved: {error}"));
    }
    if mutable.session.is_active() {
        fail("Session interrupted before completion")
    } else {
        Ok(())
    }
}

async fn script_handler() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("script.js");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/javascript"),
            (CACHE_CONTROL, CACHE_CONTROL_IMMUTABLE),
        ],
        bytes,
    )
}

async fn style_handler() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, CACHE_CONTROL_IMMUTABLE),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}

async fn image_handler(
    State(state): State<ServerState>,
    Path(path): Path<String>,
) -> (StatusCode, [(HeaderName, &'static str); 1], Vec<u8>) {
    let loader = ImageLoader::new(state.directory.clone());
    let validated = match loader.validate(&path) {
        Ok(p) => p,
        Err(e) => {
            log::debug!("Refusing to serve image {path}: {e:?}");
            return (
                StatusCode::NOT_FOUND,
                [(CONTENT_TYPE, "text/plain")],
                b"Not Found".to_vec(),
            );
        }
    };
    let mime = content_type(&validated).unwrap_or("application/octet-stream");
    match tokio::fs::read(&validated).await {
        Ok(bytes) => (StatusCode::OK, [(CONTENT_TYPE, mime)], bytes),
        Err(e) => {
            log::error!("Failed to read {}: {e}", validated.display());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(CONTENT_TYPE, "text/plain")],
                b"Internal Server Error".to_vec(),
            )
        }
    }
}

async fn shutdown_signal(shutdown_rx: Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    let shutdown = async {
        shutdown_rx.await.ok();
    };

    select! {
        _ = ctrl_c => {
            log::debug!("Received Ctrl+C, shutting down gracefully");
        },
        _ = shutdown => {
            log::debug!("Received shutdown signal, shutting down gracefully");
        },
    }
}
