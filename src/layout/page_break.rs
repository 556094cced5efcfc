//! # Page Break Decisions
//!
//! Rows are unbreakable: a row either fits in what is left of the current
//! page or moves whole to the next one. The only exception is a row taller
//! than an entire page, which is placed alone rather than dropped or cut.
//!
//! Capacity is the usable height minus the header and footer reservation,
//! so the paginator never has to know those rows exist.

use crate::layout::Row;

/// Tolerance for float accumulation when comparing heights.
const EPSILON: f64 = 1e-9;

/// What to do with the next row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakDecision {
    /// The row fits in the remaining space.
    Place,
    /// Close the current page and place the row on a new one.
    MoveToNextPage,
    /// The row is taller than a whole page and the current page is empty:
    /// place it here, alone.
    PlaceOversized,
}

/// Decide where a row of `height` goes.
pub fn decide_break(
    height: f64,
    remaining: f64,
    capacity: f64,
    page_is_empty: bool,
) -> BreakDecision {
    if height <= remaining + EPSILON {
        BreakDecision::Place
    } else if page_is_empty && height > capacity + EPSILON {
        BreakDecision::PlaceOversized
    } else {
        BreakDecision::MoveToNextPage
    }
}

/// A row with its height resolved for placement.
#[derive(Debug, Clone)]
pub struct PlacedRow {
    pub row: Row,
    pub height: f64,
}

/// Accumulates placed rows into pages.
#[derive(Debug, Clone)]
pub struct Paginator {
    capacity: f64,
    remaining: f64,
    closed: Vec<Vec<PlacedRow>>,
    current: Vec<PlacedRow>,
}

impl Paginator {
    pub fn new(capacity: f64) -> Self {
        Self {
            capacity,
            remaining: capacity,
            closed: Vec::new(),
            current: Vec::new(),
        }
    }

    /// Change the per-page capacity. Only meaningful before any row is placed.
    pub fn set_capacity(&mut self, capacity: f64) {
        debug_assert!(self.is_empty());
        self.capacity = capacity;
        self.remaining = capacity;
    }

    /// True if no row has been placed yet.
    pub fn is_empty(&self) -> bool {
        self.closed.is_empty() && self.current.is_empty()
    }

    /// Would a row of `height` fit on the current page.
    pub fn fits(&self, height: f64) -> bool {
        height <= self.remaining + EPSILON
    }

    /// Place a row, opening a new page first if it does not fit. An
    /// oversized row closes its page behind it, so nothing joins it.
    pub fn place(&mut self, row: PlacedRow) {
        let decision = decide_break(row.height, self.remaining, self.capacity, self.current.is_empty());
        match decision {
            BreakDecision::Place => {}
            BreakDecision::MoveToNextPage => self.break_page(),
            BreakDecision::PlaceOversized => {
                log::debug!(
                    "row of {:.2} mm exceeds page capacity {:.2} mm, placing it alone",
                    row.height,
                    self.capacity
                );
            }
        }
        self.remaining = (self.remaining - row.height).max(0.0);
        self.current.push(row);
        if decision == BreakDecision::PlaceOversized {
            self.break_page();
        }
    }

    /// Close the current page if it holds any rows.
    pub fn break_page(&mut self) {
        if self.current.is_empty() {
            return;
        }
        log::debug!(
            "page {} closed with {} rows",
            self.closed.len() + 1,
            self.current.len()
        );
        self.closed.push(std::mem::take(&mut self.current));
        self.remaining = self.capacity;
    }

    /// Snapshot of all pages, including the one in progress. Always at
    /// least one page, which may be empty.
    pub fn pages(&self) -> Vec<Vec<PlacedRow>> {
        let mut pages = self.closed.clone();
        if !self.current.is_empty() || pages.is_empty() {
            pages.push(self.current.clone());
        }
        pages
    }

    pub fn page_count(&self) -> usize {
        self.closed.len() + usize::from(!self.current.is_empty() || self.closed.is_empty())
    }
}
