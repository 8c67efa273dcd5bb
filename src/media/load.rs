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

use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Image formats a card may reference, with their content types.
const IMAGE_TYPES: [(&str, &str); 6] = [
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("svg", "image/svg+xml"),
    ("webp", "image/webp"),
];

/// Resolves card image references, which are paths relative to the
/// collection root, to files on disk.
///
/// Paths come from the browser, so anything that could escape the
/// collection or point at something other than an image is refused.
pub struct ImageLoader {
    root: PathBuf,
}

#[derive(Debug, PartialEq)]
pub enum ImageError {
    /// Path is absolute.
    Absolute,
    /// Path contains `..` components.
    ParentComponent,
    /// Extension is not a known image format.
    NotImage,
    /// Nothing exists at the path.
    NotFound,
    /// Path is a symbolic link.
    SymbolicLink,
    /// Path is a directory or other non-file.
    NotFile,
}

impl ImageLoader {
    pub fn new(root: PathBuf) -> Self {
        assert!(root.is_absolute());
        Self { root }
    }

    pub fn validate(&self, path: &str) -> Result<PathBuf, ImageError> {
        let relative = Path::new(path);
        if relative.is_absolute() || relative.has_root() {
            return Err(ImageError::Absolute);
        }
        if relative.components().any(|c| c == Component::ParentDir) {
            return Err(ImageError::ParentComponent);
        }
        if content_type(relative).is_none() {
            return Err(ImageError::NotImage);
        }
        let full = self.root.join(relative);
        if full.is_symlink() {
            return Err(ImageError::SymbolicLink);
        }
        if !full.exists() {
            return Err(ImageError::NotFound);
        }
        if !full.is_file() {
            return Err(ImageError::NotFile);
        }
        Ok(full)
    }
}

/// The content type to serve an image with, by file extension.
pub fn content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, content_type)| *content_type)
}

#[cfg(test)]
mod tests {
    use std::fs::create_dir;
    use std::fs::write;

    use super::*;
    use crate::error::Fallible;
    use crate::helper::create_tmp_directory;

    #[test]
    fn test_valid_image() -> Fallible<()> {
        let root = create_tmp_directory()?;
        write(root.join("dog.PNG"), b"png")?;
        let loader = ImageLoader::new(root.clone());
        assert_eq!(loader.validate("dog.PNG"), Ok(root.join("dog.PNG")));
        Ok(())
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_absolute_rejected() -> Fallible<()> {
        let loader = ImageLoader::new(create_tmp_directory()?);
        assert_eq!(loader.validate("/etc/logo.png"), Err(ImageError::Absolute));
        Ok(())
    }

    #[test]
    fn test_traversal_rejected() -> Fallible<()> {
        let loader = ImageLoader::new(create_tmp_directory()?);
        assert_eq!(
            loader.validate("img/../../../outside.png"),
            Err(ImageError::ParentComponent)
        );
        Ok(())
    }

    #[test]
    fn test_non_images_rejected() -> Fallible<()> {
        let root = create_tmp_directory()?;
        write(root.join("lexicards.db"), b"sqlite")?;
        let loader = ImageLoader::new(root);
        assert_eq!(loader.validate("lexicards.db"), Err(ImageError::NotImage));
        assert_eq!(loader.validate("README"), Err(ImageError::NotImage));
        Ok(())
    }

    #[test]
    fn test_missing_and_directories() -> Fallible<()> {
        let root = create_tmp_directory()?;
        create_dir(root.join("folder.png"))?;
        let loader = ImageLoader::new(root);
        assert_eq!(loader.validate("nope.jpg"), Err(ImageError::NotFound));
        assert_eq!(loader.validate("folder.png"), Err(ImageError::NotFile));
        Ok(())
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_symlink_rejected() -> Fallible<()> {
        use std::os::unix::fs::symlink;

        let root = create_tmp_directory()?;
        write(root.join("real.png"), b"png")?;
        symlink(root.join("real.png"), root.join("link.png"))?;
        let loader = ImageLoader::new(root);
        assert_eq!(loader.validate("link.png"), Err(ImageError::SymbolicLink));
        Ok(())
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(Path::new("a/b.jpeg")), Some("image/jpeg"));
        assert_eq!(content_type(Path::new("a/b.svg")), Some("image/svg+xml"));
        assert_eq!(content_type(Path::new("a/b.mp3")), None);
    }
}
