use crate::error::{Result, ShuffleError};
use crate::options::Window;
use crate::ranker::RankedItem;
use serde_json::Value;

/// A selected record together with its ranked position
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRecord {
    /// Position in the full ranked order (not in the window)
    pub position: usize,
    pub record: Value,
}

/// Records split by window membership, both halves in ranked order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionResult {
    pub selected: Vec<PlacedRecord>,
    pub remaining: Vec<Value>,
}

impl SelectionResult {
    pub fn selected_records(&self) -> impl Iterator<Item = &Value> {
        self.selected.iter().map(|placed| &placed.record)
    }

    pub fn len(&self) -> usize {
        self.selected.len() + self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split `records` into the window (`selected`) and its complement (`remaining`).
///
/// `ranked` must be a permutation of the indices of `records`, as produced by
/// [`crate::rank`]. Without a window every record is selected.
pub fn partition(
    records: Vec<Value>,
    ranked: &[RankedItem],
    window: Option<Window>,
) -> Result<SelectionResult> {
    if let Some(window) = &window {
        window.validate()?;
        if window.start >= ranked.len() {
            log::warn!(
                "Subset starts at ranked position {} but only {} records exist",
                window.start,
                ranked.len()
            );
        }
    }
    if ranked.len() != records.len() {
        return Err(mismatch());
    }

    let mut slots: Vec<Option<Value>> = records.into_iter().map(Some).collect();
    let mut selection = SelectionResult::default();

    for (position, item) in ranked.iter().enumerate() {
        let record = slots
            .get_mut(item.original_index)
            .and_then(Option::take)
            .ok_or_else(mismatch)?;

        if window.map_or(true, |w| w.contains(position)) {
            selection.selected.push(PlacedRecord { position, record });
        } else {
            selection.remaining.push(record);
        }
    }

    log::debug!(
        "Partitioned {} selected / {} remaining",
        selection.selected.len(),
        selection.remaining.len()
    );
    Ok(selection)
}

fn mismatch() -> ShuffleError {
    ShuffleError::configuration("Ranked order does not match the metadata array")
}
