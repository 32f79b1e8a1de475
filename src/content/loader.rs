//! Content domain: reads and parses the RON tuning document.

use ron::Options;
use ron::extensions::Extensions;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use super::data::BossTuning;

/// Why the tuning document could not be turned into a `BossTuning`.
#[derive(Debug)]
pub enum ContentLoadError {
    Io {
        file: String,
        source: io::Error,
    },
    Parse {
        file: String,
        line: usize,
        column: usize,
        message: String,
    },
}

impl ContentLoadError {
    pub fn file(&self) -> &str {
        match self {
            Self::Io { file, .. } | Self::Parse { file, .. } => file,
        }
    }
}

impl fmt::Display for ContentLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to load {}: ", self.file())?;
        match self {
            Self::Io { source, .. } => write!(f, "IO error: {}", source),
            Self::Parse {
                line,
                column,
                message,
                ..
            } => write!(f, "parse error at {}:{}: {}", line, column, message),
        }
    }
}

impl std::error::Error for ContentLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { .. } => None,
        }
    }
}

// Optional sections can be written bare instead of `Some(...)`
fn ron_options() -> Options {
    Options::default().with_default_extension(Extensions::IMPLICIT_SOME)
}

/// Parse a tuning document from RON text. `file` labels errors.
pub fn parse_boss_tuning(file: &str, contents: &str) -> Result<BossTuning, ContentLoadError> {
    ron_options()
        .from_str(contents)
        .map_err(|e| ContentLoadError::Parse {
            file: file.to_string(),
            line: e.position.line,
            column: e.position.col,
            message: e.code.to_string(),
        })
}

/// Load the tuning document at `path`.
pub fn load_boss_tuning(path: &Path) -> Result<BossTuning, ContentLoadError> {
    let file = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| ContentLoadError::Io {
        file: file.clone(),
        source,
    })?;

    parse_boss_tuning(&file, &contents)
}
