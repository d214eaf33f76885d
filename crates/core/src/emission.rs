use crate::error::{Result, ShuffleError};
use crate::namer::Namer;
use crate::options::{ShuffleOptions, Window};
use crate::partition::PlacedRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const RECORD_EXTENSION: &str = ".json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    Aggregate,
    PerRecord,
}

/// How selected records are persisted, chosen once per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emitter {
    /// One pretty-printed JSON array
    Aggregate { path: PathBuf },

    /// One pretty-printed JSON file per record, named by token id
    PerRecord {
        dir: PathBuf,
        file_prefix: String,
        extension: bool,
    },
}

impl Emitter {
    /// Pick the strategy from the output target: an existing directory means one file per record.
    pub async fn resolve(options: &ShuffleOptions) -> Result<Self> {
        let output = match options.output.as_deref() {
            Some(path) if !path.as_os_str().is_empty() => path,
            _ => return Err(ShuffleError::configuration("Output file missing")),
        };

        if path_exists(output).await? {
            let metadata = tokio::fs::metadata(output)
                .await
                .map_err(|err| ShuffleError::io(output, err))?;
            if metadata.is_dir() {
                return Ok(Self::PerRecord {
                    dir: output.to_path_buf(),
                    file_prefix: options.file_prefix().to_string(),
                    extension: options.extension,
                });
            }
        } else if !parent_exists(output).await? {
            return Err(ShuffleError::not_found(
                "Folder containing output file not found",
            ));
        }

        Ok(Self::Aggregate {
            path: output.to_path_buf(),
        })
    }

    pub fn mode(&self) -> OutputMode {
        match self {
            Self::Aggregate { .. } => OutputMode::Aggregate,
            Self::PerRecord { .. } => OutputMode::PerRecord,
        }
    }

    pub fn target(&self) -> &Path {
        match self {
            Self::Aggregate { path } => path,
            Self::PerRecord { dir, .. } => dir,
        }
    }

    /// File name for one record in per-record mode: `<prefix><tokenId>[.json]`.
    pub fn record_file_name(file_prefix: &str, token_id: u64, extension: bool) -> String {
        let suffix = if extension { RECORD_EXTENSION } else { "" };
        format!("{file_prefix}{token_id}{suffix}")
    }

    /// Persist the selected records; returns the files written.
    pub async fn emit(&self, selected: &[PlacedRecord], namer: &Namer) -> Result<Vec<PathBuf>> {
        match self {
            Self::Aggregate { path } => {
                let records: Vec<&Value> = selected.iter().map(|placed| &placed.record).collect();
                write_json(path, &records).await?;
                log::info!("Wrote {} records to {}", records.len(), path.display());
                Ok(vec![path.clone()])
            }
            Self::PerRecord {
                dir,
                file_prefix,
                extension,
            } => {
                // Files written before a failure are left in place.
                let mut written = Vec::with_capacity(selected.len());
                for placed in selected {
                    let token_id = namer.token_id(placed.position)?;
                    let path = dir.join(Self::record_file_name(file_prefix, token_id, *extension));
                    write_json(&path, &placed.record).await?;
                    written.push(path);
                }
                log::info!("Wrote {} record files to {}", written.len(), dir.display());
                Ok(written)
            }
        }
    }
}

async fn path_exists(path: &Path) -> Result<bool> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|err| ShuffleError::io(path, err))
}

async fn parent_exists(path: &Path) -> Result<bool> {
    match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Ok(true),
        Some(parent) => path_exists(parent).await,
        None => Ok(false),
    }
}

/// Check that the remaining file can be created: not a folder, inside an existing folder.
pub async fn check_remaining_target(path: &Path) -> Result<()> {
    if path_exists(path).await? {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|err| ShuffleError::io(path, err))?;
        if metadata.is_dir() {
            return Err(ShuffleError::configuration("Remaining file is a folder"));
        }
    } else if !parent_exists(path).await? {
        return Err(ShuffleError::not_found(
            "Folder containing remaining file not found",
        ));
    }
    Ok(())
}

/// Sibling of `input` named after the window and the current time, so reruns never collide.
pub fn default_remaining_path(input: &Path, window: Window, unix_secs: u64) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "metadata".to_string());
    let name = format!(
        "{stem}-remaining-{}-{}-{unix_secs}.json",
        window.start, window.end
    );
    match input.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

pub(crate) fn current_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|dur| dur.as_secs())
        .unwrap_or(0)
}

/// Write `value` as 2-space indented JSON.
pub async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, text)
        .await
        .map_err(|err| ShuffleError::io(path, err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    fn with_output(output: &Path) -> ShuffleOptions {
        ShuffleOptions {
            output: Some(output.to_path_buf()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn missing_output_is_a_configuration_error() {
        let err = Emitter::resolve(&ShuffleOptions::default()).await.unwrap_err();
        assert!(matches!(err, ShuffleError::Configuration(_)));
        assert_eq!(err.to_string(), "Output file missing");
    }

    #[tokio::test]
    async fn directory_output_selects_per_record_mode() {
        let temp = tempdir().unwrap();
        let mut options = with_output(temp.path());
        options.file_prefix = Some("ape-".to_string());
        options.extension = true;

        let emitter = Emitter::resolve(&options).await.unwrap();
        assert_eq!(emitter.mode(), OutputMode::PerRecord);
        assert_eq!(
            emitter,
            Emitter::PerRecord {
                dir: temp.path().to_path_buf(),
                file_prefix: "ape-".to_string(),
                extension: true,
            }
        );
    }

    #[tokio::test]
    async fn file_output_requires_existing_parent() {
        let temp = tempdir().unwrap();
        let emitter = Emitter::resolve(&with_output(&temp.path().join("out.json")))
            .await
            .unwrap();
        assert_eq!(emitter.mode(), OutputMode::Aggregate);

        let err = Emitter::resolve(&with_output(&temp.path().join("missing/out.json")))
            .await
            .unwrap_err();
        assert!(matches!(err, ShuffleError::NotFound(_)));
        assert_eq!(err.to_string(), "Folder containing output file not found");
    }

    #[test]
    fn record_file_names() {
        assert_eq!(Emitter::record_file_name("", 12, false), "12");
        assert_eq!(Emitter::record_file_name("token-", 12, true), "token-12.json");
    }

    #[test]
    fn remaining_path_is_sibling_of_input() {
        let path = default_remaining_path(
            Path::new("/data/all-meta.json"),
            Window { start: 0, end: 99 },
            1_700_000_000,
        );
        assert_eq!(
            path,
            PathBuf::from("/data/all-meta-remaining-0-99-1700000000.json")
        );
    }

    #[tokio::test]
    async fn per_record_files_use_token_ids() {
        let temp = tempdir().unwrap();
        let emitter = Emitter::PerRecord {
            dir: temp.path().to_path_buf(),
            file_prefix: String::new(),
            extension: false,
        };
        let namer = Namer::from_options(&ShuffleOptions::default());
        let selected = vec![
            PlacedRecord {
                position: 4,
                record: json!({"name": "a"}),
            },
            PlacedRecord {
                position: 5,
                record: json!({"name": "b"}),
            },
        ];

        let written = emitter.emit(&selected, &namer).await.unwrap();
        assert_eq!(written, vec![temp.path().join("5"), temp.path().join("6")]);
        let text = std::fs::read_to_string(temp.path().join("6")).unwrap();
        assert_eq!(text, "{\n  \"name\": \"b\"\n}");
    }

    #[tokio::test]
    async fn failed_write_names_the_file() {
        let temp = tempdir().unwrap();
        let target = temp.path().join("gone/out.json");
        let err = write_json(&target, &json!([])).await.unwrap_err();
        assert!(matches!(err, ShuffleError::Io { .. }));
        let message = err.to_string();
        assert!(
            message.starts_with(&format!("IO error on {}: ", target.display())),
            "unexpected message {message}"
        );
    }

    #[tokio::test]
    async fn remaining_target_is_checked() {
        let temp = tempdir().unwrap();
        assert!(check_remaining_target(&temp.path().join("rest.json")).await.is_ok());

        let err = check_remaining_target(&temp.path().join("nope/rest.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, ShuffleError::NotFound(_)));
        assert_eq!(err.to_string(), "Folder containing remaining file not found");

        let err = check_remaining_target(temp.path()).await.unwrap_err();
        assert_eq!(err.to_string(), "Remaining file is a folder");
    }
}
