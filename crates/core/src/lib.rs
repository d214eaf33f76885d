//! # Metashu Core
//!
//! Verifiable shuffling of NFT metadata arrays.
//!
//! Every record is hashed together with a salt that nobody knows in advance
//! (typically a future block hash). Sorting by digest yields an order that is
//! unpredictable before the salt is published and re-derivable by anyone after.
//!
//! ## Pipeline
//!
//! ```text
//! metadata.json
//!     │
//!     ├──> Ranker       H(json(record) || salt), stable sort by digest
//!     │
//!     ├──> Partitioner  [start, end] window → selected / remaining
//!     │
//!     ├──> Namer        tokenId = position + firstId, prefix / mask renaming
//!     │
//!     └──> Emitter      one array file, or one file per token id
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use metashu_core::{ShuffleOptions, Shuffler};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let options = ShuffleOptions {
//!         input: Some("all-meta.json".into()),
//!         output: Some("meta".into()),
//!         salt: Some("0x0863243f8d858815db8de23b7f1399b8f975672a750284209ac35e8d91d89afd".into()),
//!         add_token_id: true,
//!         ..Default::default()
//!     };
//!     let report = Shuffler::new(options).run().await?;
//!     println!("{} records written to {}", report.selected, report.output.display());
//!     Ok(())
//! }
//! ```

mod digest;
mod emission;
mod engine;
mod error;
mod input;
mod namer;
mod options;
mod partition;
mod ranker;
mod shuffler;

pub use digest::{Blake3Digester, Digest, Digester, HashAlgorithm, Sha256Digester, DIGEST_LEN};
pub use emission::{
    check_remaining_target, default_remaining_path, write_json, Emitter, OutputMode,
};
pub use engine::{shuffle, Engine};
pub use error::{Result, ShuffleError};
pub use input::{load_metadata, resolve_input};
pub use namer::{render_mask, Namer};
pub use options::{ShuffleOptions, Window, DEFAULT_FIRST_ID};
pub use partition::{partition, PlacedRecord, SelectionResult};
pub use ranker::{metadata_array, rank, RankedItem};
pub use shuffler::{ShuffleReport, Shuffler};
