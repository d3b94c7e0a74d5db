//! Task data structure.

use serde::{Deserialize, Serialize};

/// A single to-do item with a stable identity and a display title.
///
/// The id is assigned by the task store at creation and stays stable for the
/// lifetime of the record. Every task that reaches the list screen has a
/// non-empty title; the prompt discards blank input before it gets here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
}
