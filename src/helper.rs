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

use std::fs::create_dir_all;
use std::fs::write;
use std::path::PathBuf;

use tempfile::tempdir;

use crate::error::Fallible;

pub const ANIMALS_DECK: &str = r#"
source_language = "en"

[[cards]]
id = "dog"
term = "dog"
level = "a1"
favorite = true
image = "img/dog.png"
translations = { de = ["Hund"] }
sentences = { en = "The *dog* barks.", de = "Der *Hund* bellt." }

[[cards]]
id = "cat"
term = "cat"
level = "a2"
translations = { de = "Katze" }
"#;

/// An empty directory that is not cleaned up.
pub fn create_tmp_directory() -> Fallible<PathBuf> {
    let dir = tempdir()?.path().to_path_buf();
    create_dir_all(&dir)?;
    Ok(dir.canonicalize()?)
}

/// A collection with two German cards, an image and a configuration file.
pub fn create_tmp_collection() -> Fallible<String> {
    let dir = create_tmp_directory()?;
    write(dir.join("animals.toml"), ANIMALS_DECK)?;
    write(dir.join("lexicards.toml"), "default_language = \"de\"\n")?;
    create_dir_all(dir.join("img"))?;
    write(dir.join("img/dog.png"), b"\x89PNG")?;
    write(dir.join("secret.txt"), "do not serve")?;
    Ok(dir.display().to_string())
}
