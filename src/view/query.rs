use crate::view::pagination::PageState;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Status,
    #[default]
    Departure,
    Gate,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Status => "status",
            SortKey::Departure => "departure",
            SortKey::Gate => "gate",
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "status" => Ok(SortKey::Status),
            "departure" => Ok(SortKey::Departure),
            "gate" => Ok(SortKey::Gate),
            other => Err(format!("unknown sort key '{other}' (expected status, departure or gate)")),
        }
    }
}

/// Search, date and sort, cleared together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub date: Option<NaiveDate>,
    pub sort: SortKey,
}

impl FilterState {
    pub fn is_default(&self) -> bool {
        *self == FilterState::default()
    }
}

/// Parameters of one `GET /api/flights` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: String,
    pub sort: SortKey,
    pub date: Option<NaiveDate>,
    pub page: u32,
}

impl ListQuery {
    pub fn new(filter: &FilterState, page: &PageState) -> Self {
        Self {
            search: filter.search.trim().to_string(),
            sort: filter.sort,
            date: filter.date,
            page: page.current_page,
        }
    }

    /// A bare page request with no filters, used when merging every page
    pub fn page(page: u32) -> Self {
        Self {
            search: String::new(),
            sort: SortKey::default(),
            date: None,
            page,
        }
    }

    /// Query-string pairs; empty search and unset date are omitted
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        pairs.push(("sort", self.sort.as_str().to_string()));
        if let Some(date) = self.date {
            pairs.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        pairs.push(("page", self.page.to_string()));
        pairs
    }
}
