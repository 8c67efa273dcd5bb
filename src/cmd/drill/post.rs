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

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use lexicards_core::CardId;
use lexicards_core::SessionError;
use lexicards_core::Step;
use serde::Deserialize;

use crate::cmd::drill::state::MutableState;
use crate::cmd::drill::state::ServerState;

#[derive(Deserialize)]
pub struct FormData {
    action: Action,
    /// The card the page was showing. Missing means the current card.
    card: Option<String>,
}

#[derive(Debug, Deserialize)]
enum Action {
    Reveal,
    Known,
    Unknown,
    Exit,
    Retry,
    Shutdown,
}

pub async fn post_handler(
    State(state): State<ServerState>,
    Form(form): Form<FormData>,
) -> Response {
    log::debug!("Action: {:?}", form.action);
    if let Action::Shutdown = form.action {
        return shutdown(&state);
    }
    let mut mutable = match state.mutable.lock() {
        Ok(mutable) => mutable,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("Session state is unavailable.".to_string()),
            )
                .into_response();
        }
    };
    let result = match form.action {
        Action::Reveal => {
            mutable.reveal = true;
            Ok(())
        }
        Action::Known => answer(&mut mutable, form.card, true),
        Action::Unknown => answer(&mut mutable, form.card, false),
        Action::Exit => exit(&mut mutable),
        Action::Retry => retry(&mut mutable),
        Action::Shutdown => Ok(()),
    };
    match result {
        Ok(()) => Redirect::to("/").into_response(),
        Err(SessionError::InvalidState(msg)) => {
            log::warn!("Rejected {:?}: {msg}", form.action);
            (StatusCode::CONFLICT, Html(format!("Conflict: {msg}"))).into_response()
        }
        Err(e) => {
            log::error!("{e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Html(e.to_string())).into_response()
        }
    }
}

fn answer(mutable: &mut MutableState, card: Option<String>, knew: bool) -> Result<(), SessionError> {
    let card: CardId = match card {
        Some(card) => CardId::new(card),
        None => match mutable.session.current_card() {
            Some(card) => card.clone(),
            None => return Err(SessionError::invalid_state("the session is over")),
        },
    };
    let MutableState {
        reveal,
        engine,
        session,
        commit_error,
    } = mutable;
    match engine.record(session, &card, knew) {
        Ok(Step::NewRound { round, cards }) => {
            log::debug!("Round {round} with {cards} cards");
            *reveal = false;
            Ok(())
        }
        Ok(_) => {
            *reveal = false;
            Ok(())
        }
        Err(SessionError::Commit(e)) => {
            *commit_error = Some(e.message().to_string());
            Ok(())
        }
        Err(SessionError::RoundLimit { limit }) => {
            log::warn!("Session abandoned after {limit} rounds");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn exit(mutable: &mut MutableState) -> Result<(), SessionError> {
    let MutableState {
        engine, session, ..
    } = mutable;
    engine.exit(session)?;
    log::info!("Session {} exited", session.id().short());
    Ok(())
}

fn retry(mutable: &mut MutableState) -> Result<(), SessionError> {
    if mutable.commit_error.is_none() {
        return Ok(());
    }
    let MutableState {
        engine,
        session,
        commit_error,
        ..
    } = mutable;
    match engine.commit(session) {
        Ok(_) => {
            *commit_error = None;
            Ok(())
        }
        Err(SessionError::Commit(e)) => {
            *commit_error = Some(e.message().to_string());
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn shutdown(state: &ServerState) -> Response {
    if let Ok(mut tx) = state.shutdown_tx.lock() {
        if let Some(tx) = tx.take() {
            let _ = tx.send(());
        }
    }
    (StatusCode::OK, Html("Shutting down.".to_string())).into_response()
}
