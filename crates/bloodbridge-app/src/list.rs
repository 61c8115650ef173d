// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Paginated, searchable list state shared by every list screen.
//!
//! A [`ListState`] owns the rows pushed in by its data source plus the view
//! parameters (search text, page size, page). Every mutation keeps the page
//! inside `[1, page_count]`, and [`ListState::derive`] turns the current state
//! into the slice of rows to render together with the pagination metadata.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;
use time::macros::format_description;

/// Page sizes offered by the list screens. Any positive size is accepted.
pub const PAGE_SIZE_OPTIONS: [usize; 4] = [5, 10, 25, 50];
pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("invalid argument: page size must be positive, got {0}")]
    InvalidArgument(i64),
}

/// A row that can be searched and rendered by a list screen.
///
/// `cells` returns the values exactly as they are displayed (formatted dates,
/// status labels), because search matches what the user sees.
pub trait ListRow {
    fn cells(&self) -> Vec<String>;

    /// `needle` must already be lowercased.
    fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self
                .cells()
                .iter()
                .any(|cell| cell.to_lowercase().contains(needle))
    }
}

impl ListRow for Vec<String> {
    fn cells(&self) -> Vec<String> {
        self.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Date(Option<Date>),
    Label(String),
}

impl CellValue {
    pub fn display(&self) -> String {
        match self {
            Self::Text(value) | Self::Label(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Date(Some(date)) => format_date(*date),
            Self::Date(None) => String::new(),
        }
    }
}

/// Mapping-based row for lists whose shape is only known at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: CellValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: CellValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

impl ListRow for Record {
    fn cells(&self) -> Vec<String> {
        self.fields.iter().map(|(_, value)| value.display()).collect()
    }
}

pub fn format_date(date: Date) -> String {
    date.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState<R> {
    rows: Vec<R>,
    query: String,
    page_size: usize,
    page: usize,
}

/// Rows and metadata for the page currently on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView<'a, R> {
    pub visible_rows: Vec<&'a R>,
    pub filtered_count: usize,
    pub page_count: usize,
    pub page: usize,
    pub range_start: usize,
    pub range_end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageControl {
    Previous { target: usize, disabled: bool },
    Page { page: usize, current: bool },
    Next { target: usize, disabled: bool },
}

impl PageControl {
    pub fn label(&self) -> String {
        match self {
            Self::Previous { .. } => "Previous".to_owned(),
            Self::Page { page, .. } => page.to_string(),
            Self::Next { .. } => "Next".to_owned(),
        }
    }

    /// Page to load when the control is activated, `None` when inert.
    pub fn target(&self) -> Option<usize> {
        match *self {
            Self::Previous { target, disabled } | Self::Next { target, disabled } => {
                (!disabled).then_some(target)
            }
            Self::Page { page, current } => (!current).then_some(page),
        }
    }
}

impl<R: ListRow> ListState<R> {
    pub fn new(page_size: i64) -> Result<Self, ListError> {
        let page_size = validate_page_size(page_size)?;
        Ok(Self {
            rows: Vec::new(),
            query: String::new(),
            page_size,
            page: 1,
        })
    }

    pub fn with_rows(mut self, rows: Vec<R>) -> Self {
        self.set_rows(rows);
        self
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Replaces the dataset. The page survives a refresh unless it no longer
    /// exists, in which case it drops to the new last page.
    pub fn set_rows(&mut self, rows: Vec<R>) {
        self.rows = rows;
        self.page = self.page.clamp(1, self.page_count());
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.query = text.into();
        self.page = 1;
    }

    pub fn set_page_size(&mut self, size: i64) -> Result<(), ListError> {
        self.page_size = validate_page_size(size)?;
        self.page = 1;
        Ok(())
    }

    pub fn set_page(&mut self, page: i64) {
        let last = self.page_count();
        self.page = usize::try_from(page.max(1)).unwrap_or(last).min(last);
    }

    pub fn next_page(&mut self) {
        self.page = (self.page + 1).min(self.page_count());
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    pub fn first_page(&mut self) {
        self.page = 1;
    }

    pub fn last_page(&mut self) {
        self.page = self.page_count();
    }

    /// Moves to the next entry of [`PAGE_SIZE_OPTIONS`], wrapping around.
    pub fn cycle_page_size(&mut self) -> usize {
        let next = PAGE_SIZE_OPTIONS
            .iter()
            .copied()
            .find(|size| *size > self.page_size)
            .unwrap_or(PAGE_SIZE_OPTIONS[0]);
        self.page_size = next;
        self.page = 1;
        next
    }

    pub fn filtered_count(&self) -> usize {
        self.matching_rows().count()
    }

    pub fn page_count(&self) -> usize {
        page_count_for(self.filtered_count(), self.page_size)
    }

    pub fn derive(&self) -> ListView<'_, R> {
        let matching: Vec<&R> = self.matching_rows().collect();
        let filtered_count = matching.len();
        let page_count = page_count_for(filtered_count, self.page_size);
        let page = self.page.clamp(1, page_count);
        let range_start = (page - 1) * self.page_size;
        let range_end = (range_start + self.page_size).min(filtered_count);
        let visible_rows = matching
            .into_iter()
            .skip(range_start)
            .take(self.page_size)
            .collect();

        ListView {
            visible_rows,
            filtered_count,
            page_count,
            page,
            range_start,
            range_end,
        }
    }

    fn matching_rows(&self) -> impl Iterator<Item = &R> {
        let needle = self.query.to_lowercase();
        self.rows.iter().filter(move |row| row.matches(&needle))
    }
}

impl<R> ListView<'_, R> {
    pub fn summary(&self) -> String {
        let first = if self.filtered_count == 0 {
            0
        } else {
            self.range_start + 1
        };
        format!(
            "Showing {first} to {} of {} entries",
            self.range_end, self.filtered_count
        )
    }

    pub fn page_controls(&self) -> Vec<PageControl> {
        let mut controls = Vec::with_capacity(self.page_count + 2);
        controls.push(PageControl::Previous {
            target: self.page.saturating_sub(1).max(1),
            disabled: self.page <= 1,
        });
        controls.extend((1..=self.page_count).map(|page| PageControl::Page {
            page,
            current: page == self.page,
        }));
        controls.push(PageControl::Next {
            target: (self.page + 1).min(self.page_count),
            disabled: self.page >= self.page_count,
        });
        controls
    }
}

fn validate_page_size(size: i64) -> Result<usize, ListError> {
    if size <= 0 {
        return Err(ListError::InvalidArgument(size));
    }
    usize::try_from(size).map_err(|_| ListError::InvalidArgument(size))
}

fn page_count_for(filtered_count: usize, page_size: usize) -> usize {
    filtered_count.div_ceil(page_size).max(1)
}
