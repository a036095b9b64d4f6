//! Pull-based row generator for a single bulk-copy batch.

use crate::payload::Payload;
use std::convert::Infallible;
use std::iter::FusedIterator;

/// Default number of rows between progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100;

/// A single generated row: identity column plus the shared payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub id: i64,
    pub payload: Payload,
}

/// Lifecycle of a `RowSource`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceState {
    /// No row has been requested yet
    Idle,
    /// The current row is valid
    Producing,
    /// Every row has been handed out; terminal
    Exhausted,
}

/// Supplies rows `1..=max_rows` on demand.
///
/// A `RowSource` is created for one batch, drained once by the bulk loader
/// and then dropped. It cannot be reset. When `max_rows <= 0` it produces
/// nothing.
///
/// The loader may drive it either through `advance`/`values` or as an
/// `Iterator`.
#[derive(Debug)]
pub struct RowSource {
    /// Rows handed out so far; also the id of the current row
    rows_produced: i64,
    max_rows: i64,
    payload: Payload,
    progress_interval: u64,
    exhausted: bool,
}

impl RowSource {
    pub fn new(max_rows: i64, payload: Payload) -> Self {
        Self {
            rows_produced: 0,
            max_rows,
            payload,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            exhausted: false,
        }
    }

    /// Log a progress line every `interval` rows. Zero disables it.
    pub fn with_progress_interval(mut self, interval: u64) -> Self {
        self.progress_interval = interval;
        self
    }

    /// Move to the next row. Returns `false` once all rows have been produced.
    pub fn advance(&mut self) -> bool {
        if self.exhausted {
            return false;
        }

        match self.rows_produced.checked_add(1) {
            Some(next) if next <= self.max_rows => {
                self.rows_produced = next;
            }
            Some(next) => {
                self.rows_produced = next;
                self.exhausted = true;
                return false;
            }
            None => {
                self.exhausted = true;
                return false;
            }
        }

        if self.progress_interval > 0 && self.rows_produced as u64 % self.progress_interval == 0 {
            tracing::info!("copied {} rows", self.rows_produced);
        }

        true
    }

    /// Column values of the current row.
    ///
    /// Only meaningful after `advance` returned `true`.
    pub fn values(&self) -> Row {
        Row {
            id: self.rows_produced,
            payload: self.payload.clone(),
        }
    }

    /// Row sources do no I/O and never fail.
    pub fn last_error(&self) -> Option<&Infallible> {
        None
    }

    pub fn rows_produced(&self) -> i64 {
        self.rows_produced
    }

    pub fn max_rows(&self) -> i64 {
        self.max_rows
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn state(&self) -> SourceState {
        if self.exhausted {
            SourceState::Exhausted
        } else if self.rows_produced == 0 {
            SourceState::Idle
        } else {
            SourceState::Producing
        }
    }

    fn remaining(&self) -> u64 {
        if self.exhausted || self.rows_produced >= self.max_rows {
            0
        } else {
            (self.max_rows - self.rows_produced) as u64
        }
    }
}

impl Iterator for RowSource {
    type Item = Row;

    fn next(&mut self) -> Option<Self::Item> {
        if self.advance() {
            Some(self.values())
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.remaining()) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl FusedIterator for RowSource {}
