use crate::digest::HashAlgorithm;
use crate::emission::{
    check_remaining_target, current_unix_secs, default_remaining_path, write_json, Emitter,
    OutputMode,
};
use crate::engine::Engine;
use crate::error::Result;
use crate::input::{load_metadata, resolve_input};
use crate::options::ShuffleOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Summary of one completed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShuffleReport {
    pub output: PathBuf,
    pub mode: OutputMode,
    pub selected: usize,
    pub remaining: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_token_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_token_id: Option<u64>,
    pub hash: HashAlgorithm,
}

/// Runs one invocation end to end: validate, load, shuffle, write.
pub struct Shuffler {
    options: ShuffleOptions,
}

impl Shuffler {
    pub fn new(options: ShuffleOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ShuffleOptions {
        &self.options
    }

    /// Every precondition is checked before the first write. Per-record files
    /// already written when a later write fails are not removed.
    pub async fn run(&self) -> Result<ShuffleReport> {
        let opts = &self.options;
        let input = resolve_input(opts.input.as_deref()).await?;
        let emitter = Emitter::resolve(opts).await?;
        let engine = Engine::from_options(opts)?;

        // Only a window can leave records out.
        let remaining_target = match engine.window() {
            Some(window) => {
                let path = opts.remaining.clone().unwrap_or_else(|| {
                    default_remaining_path(&input, window, current_unix_secs())
                });
                check_remaining_target(&path).await?;
                Some(path)
            }
            None => None,
        };

        let records = load_metadata(&input).await?;

        log::debug!(
            "Shuffling {} records from {} ({:?} mode, window {:?})",
            records.len(),
            input.display(),
            emitter.mode(),
            engine.window()
        );

        let selection = engine.run(records)?;
        emitter.emit(&selection.selected, engine.namer()).await?;

        let remaining_path = match remaining_target {
            Some(path) if !selection.remaining.is_empty() => {
                write_json(&path, &selection.remaining).await?;
                log::info!(
                    "Wrote {} remaining records to {}",
                    selection.remaining.len(),
                    path.display()
                );
                Some(path)
            }
            _ => None,
        };

        let namer = engine.namer();
        Ok(ShuffleReport {
            output: emitter.target().to_path_buf(),
            mode: emitter.mode(),
            selected: selection.selected.len(),
            remaining: selection.remaining.len(),
            remaining_path,
            first_token_id: selection
                .selected
                .first()
                .map(|p| namer.token_id(p.position))
                .transpose()?,
            last_token_id: selection
                .selected
                .last()
                .map(|p| namer.token_id(p.position))
                .transpose()?,
            hash: engine.algorithm(),
        })
    }
}
