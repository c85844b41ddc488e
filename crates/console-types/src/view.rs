use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Grid,
    List,
    Table,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
            ViewMode::Table => "table",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "grid" => Some(ViewMode::Grid),
            "list" => Some(ViewMode::List),
            "table" => Some(ViewMode::Table),
            _ => None,
        }
    }

    pub fn all() -> &'static [ViewMode] {
        &[ViewMode::Grid, ViewMode::List, ViewMode::Table]
    }
}

/// Inclusive calendar-day range (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Swaps the bounds if given in reverse.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CategoryFilter {
    #[default]
    All,
    HasAppointment,
    NoAppointment,
    /// Last activity within the past 24 hours
    Recent,
    Today,
    /// Uses `ViewState::date_range`
    CustomRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    #[default]
    Recency,
    MessageCount,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Everything the operator has chosen about how the list is shown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub view_mode: ViewMode,
    pub page: usize,
    pub page_size: usize,
    pub search_term: String,
    pub category: CategoryFilter,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
}

impl ViewState {
    pub fn new(view_mode: ViewMode, page_size: usize) -> Self {
        Self {
            view_mode,
            page: 1,
            page_size,
            search_term: String::new(),
            category: CategoryFilter::All,
            date_range: None,
            sort_key: SortKey::Recency,
            sort_order: SortOrder::Desc,
        }
    }

    /// True when no search, category or date restriction is active.
    pub fn is_unfiltered(&self) -> bool {
        self.search_term.trim().is_empty()
            && self.category == CategoryFilter::All
            && self.date_range.is_none()
    }
}
