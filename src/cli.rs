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
use std::process::exit;

use clap::Parser;
use clap::ValueEnum;
use lexicards_core::Mode;
use tokio::spawn;

use crate::cmd::check::check_collection;
use crate::cmd::drill::server::ServerConfig;
use crate::cmd::drill::server::start_server;
use crate::cmd::reset::reset_language;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::error::Fallible;
use crate::utils::SERVER_STARTUP_TIMEOUT;
use crate::utils::wait_for_server;

#[derive(ValueEnum, Clone, Copy, PartialEq)]
pub enum ModeArg {
    /// Learn cards never studied in the target language.
    Study,
    /// Recall translations of cards not yet recognized.
    Recognition,
    /// Review already learned cards without changing progress.
    Freestyle,
}

impl Display for ModeArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ModeArg::Study => write!(f, "study"),
            ModeArg::Recognition => write!(f, "recognition"),
            ModeArg::Freestyle => write!(f, "freestyle"),
        }
    }
}

impl From<ModeArg> for Mode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Study => Mode::Study,
            ModeArg::Recognition => Mode::Recognition,
            ModeArg::Freestyle => Mode::FreestyleReview,
        }
    }
}

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Drill vocabulary through a web interface.
    Drill {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Target language code. By default, `default_language` from lexicards.toml is used.
        #[arg(long)]
        language: Option<String>,
        /// Which kind of session to run.
        #[arg(long, default_value_t = ModeArg::Study)]
        mode: ModeArg,
        /// Only drill cards from this category.
        #[arg(long)]
        category: Option<String>,
        /// Maximum number of cards in a study or recognition session. Default is 30.
        #[arg(long)]
        session_size: Option<usize>,
        /// Seed for the card order. By default, the order is different every time.
        #[arg(long)]
        seed: Option<u64>,
        /// The host address to bind to. Default is 127.0.0.1.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// The port to use for the web server. Default is 8000.
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Whether to open the browser automatically. Default is true.
        #[arg(long)]
        open_browser: Option<bool>,
    },
    /// Check the integrity of a collection.
    Check {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Print per-language progress and recent sessions.
    Stats {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Which output format to use.
        #[arg(long, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Forget all progress in a language.
    Reset {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Language to reset. By default, `default_language` from lexicards.toml is used.
        #[arg(long)]
        language: Option<String>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Drill {
            directory,
            language,
            mode,
            category,
            session_size,
            seed,
            host,
            port,
            open_browser,
        } => {
            if open_browser.unwrap_or(true) {
                // Start a separate task to open the browser once the server is up.
                let browser_host = host.clone();
                spawn(async move {
                    match wait_for_server(&browser_host, port, SERVER_STARTUP_TIMEOUT).await {
                        Ok(_) => {
                            let _ = open::that(format!("http://{browser_host}:{port}/"));
                        }
                        Err(e) => {
                            eprintln!("Failed to connect to server: {e}");
                            exit(-1)
                        }
                    }
                });
            }
            let config = ServerConfig {
                directory,
                host,
                port,
                language,
                mode: mode.into(),
                category,
                session_size,
                seed,
            };
            start_server(config).await
        }
        Command::Check { directory } => check_collection(directory),
        Command::Stats { directory, format } => print_stats(directory, format),
        Command::Reset {
            directory,
            language,
        } => reset_language(directory, language),
    }
}
