use crate::digest::{Digester, HashAlgorithm};
use crate::error::Result;
use crate::namer::Namer;
use crate::options::{ShuffleOptions, Window};
use crate::partition::{partition, SelectionResult};
use crate::ranker::rank;
use serde_json::Value;

/// Validated, I/O-free pipeline: rank → partition → name.
pub struct Engine {
    salt: String,
    window: Option<Window>,
    namer: Namer,
    digester: Box<dyn Digester + Send + Sync>,
}

impl Engine {
    /// Fails on a missing salt or an invalid subset/limit.
    pub fn from_options(options: &ShuffleOptions) -> Result<Self> {
        let salt = options.salt()?.to_string();
        let window = options.window()?;
        Ok(Self {
            salt,
            window,
            namer: Namer::from_options(options),
            digester: options.hash.digester(),
        })
    }

    pub fn window(&self) -> Option<Window> {
        self.window
    }

    pub fn namer(&self) -> &Namer {
        &self.namer
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.digester.algorithm()
    }

    /// Fails before ranking when the last token id would not fit in a `u64`.
    pub fn run(&self, records: Vec<Value>) -> Result<SelectionResult> {
        if let Some(last_position) = records.len().checked_sub(1) {
            self.namer.token_id(last_position)?;
        }
        let ranked = rank(&records, &self.salt, self.digester.as_ref())?;
        let mut selection = partition(records, &ranked, self.window)?;
        for placed in &mut selection.selected {
            self.namer.apply(&mut placed.record, placed.position)?;
        }
        Ok(selection)
    }
}

/// Shuffle an in-memory metadata array according to `options`.
///
/// Path-related options (`input`, `output`, `remaining`, file naming) are ignored.
pub fn shuffle(records: Vec<Value>, options: &ShuffleOptions) -> Result<SelectionResult> {
    Engine::from_options(options)?.run(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShuffleError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn options(salt: &str) -> ShuffleOptions {
        ShuffleOptions {
            salt: Some(salt.to_string()),
            ..Default::default()
        }
    }

    fn records(count: usize) -> Vec<Value> {
        (0..count)
            .map(|i| json!({ "name": format!("Token {i}"), "rarity": i % 3 }))
            .collect()
    }

    #[test]
    fn requires_salt() {
        let err = shuffle(records(3), &ShuffleOptions::default()).unwrap_err();
        assert!(matches!(err, ShuffleError::Configuration(_)));
    }

    #[test]
    fn names_only_selected_records() {
        let opts = ShuffleOptions {
            limit: Some(4),
            add_token_id: true,
            prefix: Some("Ape #".to_string()),
            ..options("0xfeed")
        };
        let selection = shuffle(records(10), &opts).unwrap();
        assert_eq!(selection.selected.len(), 4);
        for (i, placed) in selection.selected.iter().enumerate() {
            assert_eq!(placed.record["tokenId"], (i + 1) as u64);
            assert_eq!(placed.record["name"], format!("Ape #{}", i + 1));
        }
        assert!(selection.remaining.iter().all(|r| r.get("tokenId").is_none()));
        assert!(selection
            .remaining
            .iter()
            .all(|r| r["name"].as_str().unwrap().starts_with("Token ")));
    }

    #[test]
    fn token_ids_follow_ranked_position_inside_window() {
        let opts = ShuffleOptions {
            subset: Some(Window { start: 3, end: 5 }),
            add_token_id: true,
            ..options("0xfeed")
        };
        let selection = shuffle(records(10), &opts).unwrap();
        let ids: Vec<u64> = selection
            .selected_records()
            .map(|r| r["tokenId"].as_u64().unwrap())
            .collect();
        assert_eq!(ids, vec![4, 5, 6]);
    }

    #[test]
    fn first_id_too_large_for_record_count_is_rejected() {
        let opts = ShuffleOptions {
            first_id: Some(u64::MAX - 2),
            ..options("0xfeed")
        };
        assert!(shuffle(records(3), &opts).is_ok());
        let err = shuffle(records(4), &opts).unwrap_err();
        assert!(matches!(err, ShuffleError::Configuration(_)));
        assert!(err.to_string().starts_with("Token id overflows"));
    }

    #[test]
    fn algorithms_produce_different_orders() {
        let sha = shuffle(records(30), &options("salt")).unwrap();
        let blake = shuffle(
            records(30),
            &ShuffleOptions {
                hash: HashAlgorithm::Blake3,
                ..options("salt")
            },
        )
        .unwrap();
        assert_eq!(sha.len(), blake.len());
        assert_ne!(sha.selected, blake.selected);
    }
}
