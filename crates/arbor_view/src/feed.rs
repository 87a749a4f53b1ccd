//! Message feed - the display log for drained engine messages
//!
//! ```text
//! get_pending() ──► batch ──► MessageFeed::append ──► entries (append-only)
//!                                                        │
//!                                         since(cursor) ◄┘  (incremental display)
//! ```
//!
//! Growth is unbounded. Nothing is ever dropped or deduplicated; whether a
//! message shows up once depends only on the engine's drain discipline.

/// Feed counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    /// Batches appended
    pub batches: u64,
    /// Batches that carried nothing
    pub empty_batches: u64,
    /// Largest batch seen
    pub largest_batch: usize,
}

/// Append-only ordered message log
#[derive(Debug, Clone, Default)]
pub struct MessageFeed {
    entries: Vec<String>,
    stats: FeedStats,
}

impl MessageFeed {
    /// Creates an empty feed
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a drained batch in order. Returns the batch length.
    pub fn append(&mut self, batch: Vec<String>) -> usize {
        let count = batch.len();
        self.stats.batches += 1;
        if count == 0 {
            self.stats.empty_batches += 1;
        }
        self.stats.largest_batch = self.stats.largest_batch.max(count);
        self.entries.extend(batch);
        count
    }

    /// Number of messages held
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was ever appended
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All messages, oldest first
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Messages appended after `cursor` entries. Pass the previous `len()`.
    #[must_use]
    pub fn since(&self, cursor: usize) -> &[String] {
        self.entries.get(cursor..).unwrap_or(&[])
    }

    /// Most recent message
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    /// The whole log, one message per line
    #[must_use]
    pub fn transcript(&self) -> String {
        self.entries.join("\n")
    }

    /// Counters
    #[must_use]
    pub const fn stats(&self) -> &FeedStats {
        &self.stats
    }
}
