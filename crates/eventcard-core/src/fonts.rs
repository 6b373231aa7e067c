//! Font registration and the fonts-ready gate.
//!
//! A [`FontBook`] collects font files as they are loaded. Once loading is
//! complete it is consumed into [`FontsReady`], which is the only handle that
//! can build a shaping measurer or a raster backend. Code that holds a
//! `FontsReady` can therefore never measure text against a half-loaded font
//! set.

use std::path::Path;
use std::sync::Arc;

use ttf_parser::name_id;

/// Errors raised while registering fonts.
#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("failed to read font file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("not a valid font: {0}")]
    Parse(String),
}

/// One registered font face.
#[derive(Debug, Clone)]
pub struct FontFace {
    /// Family name read from the font's name table.
    pub family: String,
    pub data: Arc<[u8]>,
}

/// Fonts collected so far. Not usable for measurement until [`FontBook::ready`].
#[derive(Debug, Default)]
pub struct FontBook {
    faces: Vec<FontFace>,
}

impl FontBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a font from binary data. Returns the registered family name.
    pub fn register(&mut self, data: Vec<u8>) -> Result<&FontFace, FontError> {
        let family = family_name(&data)?;
        tracing::debug!(family = %family, bytes = data.len(), "registered font");
        self.faces.push(FontFace {
            family,
            data: data.into(),
        });
        let index = self.faces.len() - 1;
        Ok(&self.faces[index])
    }

    /// Register every `.ttf`/`.otf` file directly inside `dir`.
    ///
    /// Files that fail to parse are skipped with a warning; an unreadable
    /// directory is an error.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, FontError> {
        let io_err = |source| FontError::Io {
            path: dir.display().to_string(),
            source,
        };

        let mut loaded = 0;
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            let is_font = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ttf" | "otf"));
            if !is_font {
                continue;
            }

            let data = std::fs::read(&path).map_err(|source| FontError::Io {
                path: path.display().to_string(),
                source,
            })?;
            match self.register(data) {
                Ok(_) => loaded += 1,
                Err(err) => tracing::warn!(path = %path.display(), error = %err, "skipping font"),
            }
        }
        Ok(loaded)
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.faces.iter().map(|face| face.family.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Finish loading. The returned handle is cheap to clone and share.
    pub fn ready(self) -> FontsReady {
        FontsReady {
            faces: self.faces.into(),
        }
    }
}

/// Proof that font loading has finished.
#[derive(Debug, Clone)]
pub struct FontsReady {
    faces: Arc<[FontFace]>,
}

impl FontsReady {
    pub fn faces(&self) -> &[FontFace] {
        &self.faces
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.faces.iter().map(|face| face.family.as_str())
    }

    /// True when no custom fonts were registered; measuring and rasterizing
    /// then both use the system fonts.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

/// Read the family name of the first face in `data`.
fn family_name(data: &[u8]) -> Result<String, FontError> {
    let face = ttf_parser::Face::parse(data, 0).map_err(|err| FontError::Parse(err.to_string()))?;

    let names = face.names();
    let lookup = |id: u16| {
        names
            .into_iter()
            .filter(|name| name.name_id == id && name.is_unicode())
            .find_map(|name| name.to_string())
    };

    lookup(name_id::TYPOGRAPHIC_FAMILY)
        .or_else(|| lookup(name_id::FAMILY))
        .ok_or_else(|| FontError::Parse("font has no family name".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_garbage() {
        let mut book = FontBook::new();
        let err = book.register(vec![0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, FontError::Parse(_)));
        assert!(book.is_empty());
    }

    #[test]
    fn test_empty_book_is_ready() {
        let ready = FontBook::new().ready();
        assert!(ready.is_empty());
        assert_eq!(ready.families().count(), 0);
    }

    #[test]
    fn test_load_missing_dir_fails() {
        let mut book = FontBook::new();
        let err = book
            .load_dir(Path::new("/definitely/not/a/font/dir"))
            .unwrap_err();
        assert!(matches!(err, FontError::Io { .. }));
    }
}
