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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use lexicards_core::Card;
use lexicards_core::Mode;
use lexicards_core::Session;
use lexicards_core::SessionStatus;
use maud::Markup;
use maud::PreEscaped;
use maud::html;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;

use crate::cmd::drill::state::MutableState;
use crate::cmd::drill::state::ServerState;
use crate::cmd::drill::template::page_template;
use crate::markdown::sentence_to_html;

/// Characters left alone when an image path is put in a URL.
const IMAGE_PATH: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    let mutable = match state.mutable.lock() {
        Ok(mutable) => mutable,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html("Session state is unavailable.".to_string()),
            );
        }
    };
    let (heading, body) = match mutable.session.status() {
        SessionStatus::Active => match render_card(&state, &mutable) {
            Some(body) => ("Drill", body),
            None => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Html("Current card is missing from the collection.".to_string()),
                );
            }
        },
        SessionStatus::Completed { .. } => ("Completed", render_completed(&mutable)),
        SessionStatus::Exited { .. } => ("Ended", render_exited(&mutable.session)),
    };
    let html = page_template(heading, body);
    (StatusCode::OK, Html(html.into_string()))
}

fn render_card(state: &ServerState, mutable: &MutableState) -> Option<Markup> {
    let session = &mutable.session;
    let card: &Card = state.cards.get(session.current_card()?)?;
    let language = &state.language;
    let mode = session.mode();
    let revealed = mutable.reveal || mode == Mode::Study;
    let total = session.original_cards().len();
    let known = session.known_cards().len();
    let percent = if total == 0 { 100 } else { known * 100 / total };
    let source_sentence = card
        .source_language()
        .and_then(|source| card.sentence(source));
    let target_sentence = card.sentence(language);
    let controls = if revealed {
        html! {
            input id="known" type="submit" name="action" value="Known" title="Knew it (k)";
            input id="unknown" type="submit" name="action" value="Unknown" title="Did not know it (u)";
        }
    } else {
        html! {
            input id="reveal" type="submit" name="action" value="Reveal" title="Reveal (space)";
        }
    };
    let html = html! {
        div.root {
            div.header {
                span.mode { (mode.as_str()) " / " (language) }
                span.round { "Round " (session.round_number()) }
                span.position {
                    (session.position() + 1) " of " (session.round().len())
                }
            }
            div.progress-bar {
                div.progress-fill style=(format!("width: {percent}%;")) {}
            }
            div.card {
                div.card-header {
                    @if card.is_favorite() {
                        span.favorite title="Favorite" { "★" }
                    }
                    span.level { (card.level()) }
                }
                h1.term { (card.term()) }
                @if let Some(image) = card.image() {
                    img.image src=(format!("/image/{}", utf8_percent_encode(image, IMAGE_PATH))) alt=(card.term());
                }
                @if let Some(sentence) = source_sentence {
                    p.sentence { (PreEscaped(sentence_to_html(sentence))) }
                }
                @if revealed {
                    ul.translations {
                        @for translation in card.translations(language) {
                            li { (translation) }
                        }
                    }
                    @if let Some(sentence) = target_sentence {
                        p.sentence { (PreEscaped(sentence_to_html(sentence))) }
                    }
                }
            }
            form action="/" method="post" {
                input type="hidden" name="card" value=(card.id().as_str());
                div.controls {
                    (controls)
                    input id="exit" type="submit" name="action" value="Exit" title="End without saving (esc)";
                }
            }
        }
    };
    Some(html)
}

fn render_completed(mutable: &MutableState) -> Markup {
    let session = &mutable.session;
    html! {
        div.root {
            div.summary {
                h1 { "Session Completed" }
                p {
                    (session.original_cards().len()) " cards in "
                    (session.round_number()) " rounds, "
                    (session.attempts()) " answers."
                }
                @if let Some(error) = &mutable.commit_error {
                    p.error { "Progress was not saved: " (error) }
                }
                form action="/" method="post" {
                    div.controls {
                        @if mutable.commit_error.is_some() {
                            input id="retry" type="submit" name="action" value="Retry";
                        }
                        input id="shutdown" type="submit" name="action" value="Shutdown";
                    }
                }
            }
        }
    }
}

fn render_exited(session: &Session) -> Markup {
    html! {
        div.root {
            div.summary {
                h1 { "Session Ended" }
                p {
                    "Progress from this session was discarded after "
                    (session.attempts()) " answers."
                }
                form action="/" method="post" {
                    div.controls {
                        input id="shutdown" type="submit" name="action" value="Shutdown";
                    }
                }
            }
        }
    }
}
