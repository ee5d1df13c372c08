//! Table search filtering.
//!
//! Case-insensitive substring matching over row texts, with the zero-match
//! case reported distinctly so the host can insert its "no results"
//! placeholder row.

/// Outcome of applying a search filter to a table body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Visibility per input row, in order
    pub visible: Vec<bool>,
    /// Number of rows left visible
    pub visible_count: usize,
}

impl FilterOutcome {
    /// Whether a "no results" placeholder row should be shown
    #[must_use]
    pub const fn no_results(&self) -> bool {
        self.visible_count == 0
    }
}

/// Whether `query` matches a single row's text.
///
/// The query is trimmed and compared case-insensitively as a substring; an
/// empty query matches everything.
#[must_use]
pub fn row_matches(query: &str, row_text: &str) -> bool {
    let needle = query.trim().to_lowercase();
    needle.is_empty() || row_text.to_lowercase().contains(&needle)
}

/// Apply the search filter to every row
#[must_use]
pub fn filter_rows<S: AsRef<str>>(query: &str, rows: &[S]) -> FilterOutcome {
    let needle = query.trim().to_lowercase();
    let visible: Vec<bool> = rows
        .iter()
        .map(|row| needle.is_empty() || row.as_ref().to_lowercase().contains(&needle))
        .collect();
    let visible_count = visible.iter().filter(|shown| **shown).count();

    FilterOutcome {
        visible,
        visible_count,
    }
}
