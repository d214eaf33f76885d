use crate::digest::HashAlgorithm;
use crate::error::{Result, ShuffleError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// First token id when none is configured
pub const DEFAULT_FIRST_ID: u64 = 1;

/// Inclusive range `[start, end]` of ranked positions.
///
/// Serialized as a two-element array, e.g. `[0, 99]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[usize; 2]", into = "[usize; 2]")]
pub struct Window {
    pub start: usize,
    pub end: usize,
}

impl Window {
    pub fn new(start: usize, end: usize) -> Result<Self> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    /// First `count` ranked positions, i.e. `[0, count - 1]`.
    pub fn limit(count: usize) -> Result<Self> {
        match count.checked_sub(1) {
            Some(end) => Self::new(0, end),
            None => Err(ShuffleError::configuration("Invalid subset option")),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.start >= self.end {
            return Err(ShuffleError::configuration("Invalid subset option"));
        }
        Ok(())
    }

    pub const fn contains(&self, position: usize) -> bool {
        position >= self.start && position <= self.end
    }
}

impl From<[usize; 2]> for Window {
    fn from([start, end]: [usize; 2]) -> Self {
        Self { start, end }
    }
}

impl From<Window> for [usize; 2] {
    fn from(window: Window) -> Self {
        [window.start, window.end]
    }
}

/// Options for one shuffling run.
///
/// Field names follow the camelCase keys accepted in JSON option files.
/// Nothing is validated at construction; see [`crate::Engine::from_options`]
/// and [`crate::Shuffler::run`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShuffleOptions {
    /// JSON file holding the metadata array
    pub input: Option<PathBuf>,

    /// Target file, or an existing directory for one file per record
    pub output: Option<PathBuf>,

    /// Salt mixed into every record digest (e.g. a block hash)
    pub salt: Option<String>,

    /// Token id of ranked position 0
    pub first_id: Option<u64>,

    /// Write `tokenId` into every emitted record
    pub add_token_id: bool,

    /// Rename records to `<prefix><tokenId>`
    pub prefix: Option<String>,

    /// Name template with `{name}` / `{id}` placeholders; wins over `prefix`
    pub mask: Option<String>,

    /// Ranked positions to emit; everything else goes to the remaining file
    pub subset: Option<Window>,

    /// Shorthand for `subset: [0, limit - 1]`
    pub limit: Option<usize>,

    /// Where to write records outside the window
    pub remaining: Option<PathBuf>,

    /// Prefix for per-record file names
    pub file_prefix: Option<String>,

    /// Append `.json` to per-record file names
    pub extension: bool,

    /// Digest algorithm
    pub hash: HashAlgorithm,
}

impl ShuffleOptions {
    pub fn first_id(&self) -> u64 {
        self.first_id.unwrap_or(DEFAULT_FIRST_ID)
    }

    pub fn salt(&self) -> Result<&str> {
        match self.salt.as_deref() {
            Some(salt) if !salt.is_empty() => Ok(salt),
            _ => Err(ShuffleError::configuration("No salt specified")),
        }
    }

    /// Resolve `subset` / `limit` into a validated window.
    pub fn window(&self) -> Result<Option<Window>> {
        match (self.subset, self.limit) {
            (Some(_), Some(_)) => Err(ShuffleError::configuration(
                "Use either subset or limit, not both",
            )),
            (Some(window), None) => {
                window.validate()?;
                Ok(Some(window))
            }
            (None, Some(count)) => Window::limit(count).map(Some),
            (None, None) => Ok(None),
        }
    }

    pub fn file_prefix(&self) -> &str {
        self.file_prefix.as_deref().unwrap_or_default()
    }
}
