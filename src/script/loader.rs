use crate::script::schema::{EditScript, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ScriptError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Toml {
        path: Option<PathBuf>,
        source: toml_edit::de::Error,
    },
    Json {
        path: Option<PathBuf>,
        source: serde_json::Error,
    },
    Validation {
        path: Option<PathBuf>,
        source: ValidationError,
    },
}

impl ScriptError {
    /// The script file the error came from, when known.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ScriptError::Io { path, .. } => Some(path),
            ScriptError::Toml { path, .. }
            | ScriptError::Json { path, .. }
            | ScriptError::Validation { path, .. } => path.as_deref(),
        }
    }

    fn path_slot(&mut self) -> Option<&mut Option<PathBuf>> {
        match self {
            ScriptError::Io { .. } => None,
            ScriptError::Toml { path, .. }
            | ScriptError::Json { path, .. }
            | ScriptError::Validation { path, .. } => Some(path),
        }
    }

    /// Attach `path` unless the error already names one.
    fn with_path(mut self, path: &Path) -> Self {
        if let Some(slot) = self.path_slot() {
            if slot.is_none() {
                *slot = Some(path.to_path_buf());
            }
        }
        self
    }

    fn summary(&self) -> &'static str {
        match self {
            ScriptError::Io { .. } => "failed to read edit script",
            ScriptError::Toml { .. } => "failed to parse edit script TOML",
            ScriptError::Json { .. } => "failed to parse edit script JSON",
            ScriptError::Validation { .. } => "invalid edit script",
        }
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.summary())?;
        if let Some(path) = self.path() {
            write!(f, " ({})", path.display())?;
        }
        match std::error::Error::source(self) {
            Some(source) => write!(f, ": {source}"),
            None => Ok(()),
        }
    }
}

impl std::error::Error for ScriptError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScriptError::Io { source, .. } => Some(source),
            ScriptError::Toml { source, .. } => Some(source),
            ScriptError::Json { source, .. } => Some(source),
            ScriptError::Validation { source, .. } => Some(source),
        }
    }
}

/// Parse and validate a TOML edit script.
pub fn load_from_str(input: &str) -> Result<EditScript, ScriptError> {
    let script: EditScript = toml_edit::de::from_str(input)
        .map_err(|source| ScriptError::Toml { path: None, source })?;
    validated(script)
}

/// Parse and validate a JSON edit script.
pub fn load_json_str(input: &str) -> Result<EditScript, ScriptError> {
    let script: EditScript = serde_json::from_str(input)
        .map_err(|source| ScriptError::Json { path: None, source })?;
    validated(script)
}

/// Load an edit script, choosing JSON for `.json` files and TOML otherwise.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<EditScript, ScriptError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let loaded = if is_json {
        load_json_str(&contents)
    } else {
        load_from_str(&contents)
    };
    loaded.map_err(|error| error.with_path(path))
}

fn validated(script: EditScript) -> Result<EditScript, ScriptError> {
    script
        .validate()
        .map_err(|source| ScriptError::Validation { path: None, source })?;
    Ok(script)
}
