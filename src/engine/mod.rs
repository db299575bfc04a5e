//! In-memory list engine.
//!
//! Holds the full record set fetched for one view session and derives the
//! filtered and paged views from `(raw set, query, page index, page size)`.
//! The derived views are recomputed on every call and never stored.

use thiserror::Error;

use crate::config::{DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZES};
use crate::models::Employee;

/// How the engine treats a page index that falls past the filtered records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PageBounds {
    /// Leave the index alone; a stale index yields an empty page.
    #[default]
    Preserve,
    /// Reset the index when the query changes and clamp it to the last page
    /// whenever it would point past the end.
    Clamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub page_sizes: Vec<usize>,
    pub default_page_size: usize,
    pub page_bounds: PageBounds,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            page_sizes: DEFAULT_PAGE_SIZES.to_vec(),
            default_page_size: DEFAULT_PAGE_SIZE,
            page_bounds: PageBounds::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Unsupported page size {size}; allowed sizes are {allowed:?}")]
    UnsupportedPageSize { size: usize, allowed: Vec<usize> },
}

/// Filter and pagination state for one list view.
#[derive(Debug, Clone)]
pub struct ListEngine {
    raw: Vec<Employee>,
    query: String,
    page_index: usize,
    page_size: usize,
    page_sizes: Vec<usize>,
    page_bounds: PageBounds,
}

impl Default for ListEngine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl ListEngine {
    pub fn new(settings: EngineSettings) -> Self {
        let mut page_sizes: Vec<usize> = settings
            .page_sizes
            .into_iter()
            .filter(|size| *size > 0)
            .collect();
        if page_sizes.is_empty() {
            page_sizes = DEFAULT_PAGE_SIZES.to_vec();
        }

        let page_size = if page_sizes.contains(&settings.default_page_size) {
            settings.default_page_size
        } else {
            page_sizes[0]
        };

        Self {
            raw: Vec::new(),
            query: String::new(),
            page_index: 0,
            page_size,
            page_sizes,
            page_bounds: settings.page_bounds,
        }
    }

    /// Replace the raw set wholesale.
    ///
    /// The query is kept. The page index is reset only when `reset_page` is
    /// set, which callers do for a fresh load.
    pub fn set_raw_set(&mut self, records: Vec<Employee>, reset_page: bool) {
        self.raw = records;
        if reset_page {
            self.page_index = 0;
        } else if self.page_bounds == PageBounds::Clamp {
            self.page_index = self.clamped(self.page_index);
        }
    }

    pub fn raw_set(&self) -> &[Employee] {
        &self.raw
    }

    /// Drop all records, e.g. after a failed load.
    pub fn clear(&mut self) {
        self.raw.clear();
        self.page_index = 0;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page_index(&self) -> usize {
        self.page_index
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_sizes(&self) -> &[usize] {
        &self.page_sizes
    }

    pub fn page_bounds(&self) -> PageBounds {
        self.page_bounds
    }

    /// Records matching the current query, in raw-set order.
    pub fn filtered_view(&self) -> Vec<&Employee> {
        let needle = normalized_query(&self.query);
        if needle.is_empty() {
            return self.raw.iter().collect();
        }
        self.raw.iter().filter(|r| r.matches(&needle)).collect()
    }

    /// The current page of the filtered view; empty when the page index is
    /// past the end.
    pub fn paged_view(&self) -> Vec<&Employee> {
        let start = self.page_index.saturating_mul(self.page_size);
        self.filtered_view()
            .into_iter()
            .skip(start)
            .take(self.page_size)
            .collect()
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        if self.page_bounds == PageBounds::Clamp {
            self.page_index = 0;
        }
    }

    pub fn set_page_index(&mut self, index: usize) {
        self.page_index = match self.page_bounds {
            PageBounds::Preserve => index,
            PageBounds::Clamp => self.clamped(index),
        };
    }

    /// Change the page size and return to the first page.
    pub fn set_page_size(&mut self, size: usize) -> Result<(), EngineError> {
        if !self.page_sizes.contains(&size) {
            return Err(EngineError::UnsupportedPageSize {
                size,
                allowed: self.page_sizes.clone(),
            });
        }
        self.page_size = size;
        self.page_index = 0;
        Ok(())
    }

    /// Number of records in the raw set.
    pub fn total(&self) -> usize {
        self.raw.len()
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered_view().len()
    }

    /// Number of pages the filtered view spans (zero when nothing matches).
    pub fn page_count(&self) -> usize {
        self.filtered_len().div_ceil(self.page_size)
    }

    /// True when nothing matches; the view renders an explicit "no match" row.
    pub fn is_no_match(&self) -> bool {
        self.filtered_len() == 0
    }

    fn clamped(&self, index: usize) -> usize {
        index.min(self.page_count().saturating_sub(1))
    }
}

fn normalized_query(query: &str) -> String {
    query.trim().to_lowercase()
}
