//! Data structures returned by card searches.
//!
//! ```text
//! SearchPage
//! ├── cards: Vec<Card>        (at most page_size, ordered by name then id)
//! ├── total: u64              (unclamped match count)
//! ├── total_pages: u64        (ceil(total / page_size))
//! ├── page_count: u64         (total_pages capped at max_pages)
//! ├── page_index: u64         (requested index after clamping)
//! └── page_size: usize
//! ```

use std::sync::Arc;
use datafusion::arrow::array::{Array, ArrayRef, StringArray};
use datafusion::arrow::compute::cast;
use datafusion::arrow::datatypes::DataType;
use datafusion::arrow::record_batch::RecordBatch;
use crate::error::QueryError;

/// Columns read for each card, in select order.
pub const CARD_COLUMNS: [&str; 10] = [
    "id", "fio", "region", "rank", "birthday", "death", "story", "awards_txt", "url", "pub_date",
];

/// One memorial card.
///
/// Every field except `id` may be absent. Empty strings in storage are read
/// as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Card {
    pub id: String,
    pub name: Option<String>,
    pub region: Option<String>,
    pub rank: Option<String>,
    pub birthday: Option<String>,
    pub death: Option<String>,
    pub story: Option<String>,
    pub awards: Option<String>,
    pub url: Option<String>,
    pub pub_date: Option<String>,
}

impl Card {
    /// Story text, or `""` if the card has none.
    pub fn story_text(&self) -> &str {
        self.story.as_deref().unwrap_or("")
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub cards: Vec<Card>,
    /// Number of matching cards, never clamped.
    pub total: u64,
    pub total_pages: u64,
    /// Pages reachable through pagination.
    pub page_count: u64,
    /// Index of this page after clamping the request.
    pub page_index: u64,
    pub page_size: usize,
}

impl SearchPage {
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// True if more pages exist than can be reached.
    pub fn is_truncated(&self) -> bool {
        self.total_pages > self.page_count
    }

    pub fn has_previous(&self) -> bool {
        self.page_index > 0
    }

    pub fn has_next(&self) -> bool {
        self.page_index + 1 < self.page_count
    }
}

/// Casts a named column to `Utf8` so that dictionary, view and integer
/// encodings (e.g. integer ids) all read the same way.
fn utf8_column(batch: &RecordBatch, name: &str) -> Result<StringArray, QueryError> {
    let column: &ArrayRef = batch
        .column_by_name(name)
        .ok_or_else(|| QueryError::UnexpectedResult(format!("missing column '{}'", name)))?;
    let casted = cast(column, &DataType::Utf8)
        .map_err(|e| QueryError::UnexpectedResult(format!("column '{}': {}", name, e)))?;
    casted
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| QueryError::UnexpectedResult(format!("column '{}' is not a string", name)))
}

fn optional(array: &StringArray, row: usize) -> Option<String> {
    if array.is_null(row) {
        return None;
    }
    let value = array.value(row);
    if value.is_empty() { None } else { Some(value.to_string()) }
}

/// Converts result batches (selected with [`CARD_COLUMNS`]) into cards, in order.
pub fn cards_from_batches(batches: &[RecordBatch]) -> Result<Vec<Card>, QueryError> {
    let mut cards = Vec::with_capacity(batches.iter().map(|b| b.num_rows()).sum());

    for batch in batches {
        let columns: Vec<Arc<StringArray>> = CARD_COLUMNS
            .iter()
            .map(|name| utf8_column(batch, name).map(Arc::new))
            .collect::<Result<_, _>>()?;
        let [id, name, region, rank, birthday, death, story, awards, url, pub_date] =
            <[Arc<StringArray>; 10]>::try_from(columns)
                .map_err(|_| QueryError::UnexpectedResult("column count".to_string()))?;

        for row in 0..batch.num_rows() {
            cards.push(Card {
                id: optional(&id, row).unwrap_or_default(),
                name: optional(&name, row),
                region: optional(&region, row),
                rank: optional(&rank, row),
                birthday: optional(&birthday, row),
                death: optional(&death, row),
                story: optional(&story, row),
                awards: optional(&awards, row),
                url: optional(&url, row),
                pub_date: optional(&pub_date, row),
            });
        }
    }

    Ok(cards)
}
