//! Flight list view state and its update function.
//!
//! Every user action or fetch completion produces a new [`ListState`] plus,
//! optionally, an [`Effect`] for the caller to run. Fetches carry a
//! [`RequestToken`]; only the response to the latest issued token is applied,
//! so a slow response can never overwrite a newer one.

use crate::models::{FlightId, FlightPage, FlightSummary};
use crate::view::pagination::PageState;
use crate::view::query::{FilterState, ListQuery, SortKey};
use crate::view::suggest::{SuggestionBox, route_label};
use chrono::NaiveDate;
use std::sync::Arc;

pub type RequestToken = u64;

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Loading,
    Ready,
    /// Fetch failed; the previously rendered list is kept
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetSearch(String),
    SetDate(Option<NaiveDate>),
    SetSort(SortKey),
    ClearFilters,
    /// Numbered button or jump-to-page; clamped into range
    GoToPage(u32),
    NextPage,
    PrevPage,
    /// Background or manual re-fetch of the current query
    Refresh,
    FetchSucceeded {
        token: RequestToken,
        page: FlightPage,
    },
    FetchFailed {
        token: RequestToken,
        message: String,
    },
    SelectSuggestion(usize),
    DismissSuggestions,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchList {
        token: RequestToken,
        query: ListQuery,
    },
}

/// Suggestion chosen from the dropdown; narrows the list to one card
#[derive(Debug, Clone, PartialEq)]
pub struct Pinned {
    pub flight_id: FlightId,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    pub filter: FilterState,
    pub page: PageState,
    pub phase: Phase,
    /// Last successfully fetched page
    pub flights: Arc<[FlightSummary]>,
    pub suggestions: SuggestionBox,
    /// Closed by the user or by navigation; stays shut until the search is edited
    pub suggestions_dismissed: bool,
    pub pinned: Option<Pinned>,
    /// Most recently issued request token
    pub latest_token: RequestToken,
    /// Token of the fetch still awaiting its response
    pub in_flight: Option<RequestToken>,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            filter: FilterState::default(),
            page: PageState::first(),
            phase: Phase::Loading,
            flights: Arc::from(Vec::new()),
            suggestions: SuggestionBox::closed(),
            suggestions_dismissed: false,
            pinned: None,
            latest_token: 0,
            in_flight: None,
        }
    }
}

impl ListState {
    /// Initial state and the first fetch
    pub fn init(filter: FilterState, page: u32) -> (Self, Effect) {
        let page = page.max(1);
        // Total pages is unknown until the first response
        let state = Self {
            filter,
            page: PageState {
                current_page: page,
                total_pages: page,
            },
            ..Default::default()
        };
        state.issue_fetch(true)
    }

    pub fn query(&self) -> ListQuery {
        ListQuery::new(&self.filter, &self.page)
    }

    /// Cards to render: the pinned suggestion alone, or the whole page
    pub fn visible_flights(&self) -> Vec<&FlightSummary> {
        match &self.pinned {
            Some(pinned) => self
                .flights
                .iter()
                .filter(|f| f.flight_id == pinned.flight_id)
                .collect(),
            None => self.flights.iter().collect(),
        }
    }

    /// Text shown in the search box
    pub fn search_text(&self) -> &str {
        match &self.pinned {
            Some(pinned) => &pinned.label,
            None => &self.filter.search,
        }
    }

    /// Ready with nothing to show; renders the "no flights" placeholder
    pub fn is_empty(&self) -> bool {
        self.phase != Phase::Loading && self.visible_flights().is_empty()
    }

    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn update(&self, action: Action) -> (Self, Option<Effect>) {
        match action {
            Action::SetSearch(search) => {
                if search == self.filter.search && self.pinned.is_none() {
                    return (self.clone(), None);
                }
                let suggestions = SuggestionBox::for_search(&self.flights, &search);
                let filter = FilterState {
                    search,
                    ..self.filter.clone()
                };
                let next = Self {
                    suggestions,
                    suggestions_dismissed: false,
                    ..self.with_filter(filter)
                };
                let (next, effect) = next.issue_fetch(true);
                (next, Some(effect))
            }
            Action::SetDate(date) => {
                if date == self.filter.date {
                    return (self.clone(), None);
                }
                let filter = FilterState {
                    date,
                    ..self.filter.clone()
                };
                let (next, effect) = self.with_filter(filter).issue_fetch(true);
                (next, Some(effect))
            }
            Action::SetSort(sort) => {
                if sort == self.filter.sort {
                    return (self.clone(), None);
                }
                let filter = FilterState {
                    sort,
                    ..self.filter.clone()
                };
                let (next, effect) = self.with_filter(filter).issue_fetch(true);
                (next, Some(effect))
            }
            Action::ClearFilters => {
                let next = Self {
                    suggestions: SuggestionBox::closed(),
                    suggestions_dismissed: false,
                    ..self.with_filter(FilterState::default())
                };
                let (next, effect) = next.issue_fetch(true);
                (next, Some(effect))
            }
            Action::GoToPage(page) => self.go_to(self.page.clamp_page(page)),
            Action::NextPage => {
                if self.page.has_next() {
                    self.go_to(self.page.current_page + 1)
                } else {
                    (self.clone(), None)
                }
            }
            Action::PrevPage => {
                if self.page.has_prev() {
                    self.go_to(self.page.current_page - 1)
                } else {
                    (self.clone(), None)
                }
            }
            Action::Refresh => {
                // The outstanding response already answers the current query
                if let Some(token) = self.in_flight {
                    tracing::debug!(token, "Skipping refresh, fetch still in flight");
                    return (self.clone(), None);
                }
                let (next, effect) = self.issue_fetch(false);
                (next, Some(effect))
            }
            Action::FetchSucceeded { token, page } => self.apply_page(token, page),
            Action::FetchFailed { token, message } => {
                if token != self.latest_token {
                    tracing::debug!(token, latest = self.latest_token, "Discarding stale list error");
                    return (self.clone(), None);
                }
                let next = Self {
                    phase: Phase::Error(message),
                    in_flight: None,
                    ..self.clone()
                };
                (next, None)
            }
            Action::SelectSuggestion(index) => {
                let Some(suggestion) = self.suggestions.get(index) else {
                    return (self.clone(), None);
                };
                let Some(flight) = self.flights.iter().find(|f| f.flight_id == suggestion.flight_id)
                else {
                    return (self.clone(), None);
                };
                let next = Self {
                    pinned: Some(Pinned {
                        flight_id: flight.flight_id,
                        label: route_label(flight),
                    }),
                    suggestions: SuggestionBox::closed(),
                    ..self.clone()
                };
                (next, None)
            }
            Action::DismissSuggestions => {
                let next = Self {
                    suggestions: SuggestionBox::closed(),
                    suggestions_dismissed: true,
                    ..self.clone()
                };
                (next, None)
            }
        }
    }

    /// New filters always restart at page 1 and drop the pinned suggestion
    fn with_filter(&self, filter: FilterState) -> Self {
        Self {
            filter,
            page: self.page.with_page(1),
            pinned: None,
            ..self.clone()
        }
    }

    fn go_to(&self, page: u32) -> (Self, Option<Effect>) {
        if page == self.page.current_page {
            return (self.clone(), None);
        }
        let next = Self {
            page: self.page.with_page(page),
            pinned: None,
            suggestions: SuggestionBox::closed(),
            suggestions_dismissed: true,
            ..self.clone()
        };
        let (next, effect) = next.issue_fetch(true);
        (next, Some(effect))
    }

    /// `loading` is false for background refreshes, which keep the current phase
    fn issue_fetch(&self, loading: bool) -> (Self, Effect) {
        let token = self.latest_token + 1;
        let next = Self {
            latest_token: token,
            in_flight: Some(token),
            phase: if loading {
                Phase::Loading
            } else {
                self.phase.clone()
            },
            ..self.clone()
        };
        let effect = Effect::FetchList {
            token,
            query: next.query(),
        };
        (next, effect)
    }

    fn apply_page(&self, token: RequestToken, page: FlightPage) -> (Self, Option<Effect>) {
        if token != self.latest_token {
            tracing::debug!(token, latest = self.latest_token, "Discarding stale list response");
            return (self.clone(), None);
        }

        let flights: Arc<[FlightSummary]> = Arc::from(page.flights);
        let page_state = PageState::new(page.page, page.total_pages);

        let pinned = self
            .pinned
            .clone()
            .filter(|p| flights.iter().any(|f| f.flight_id == p.flight_id));

        // Matches come from the fresh page, not the one the search was typed over
        let suggestions = if self.suggestions_dismissed || pinned.is_some() {
            SuggestionBox::closed()
        } else {
            SuggestionBox::for_search(&flights, &self.filter.search)
        };

        let next = Self {
            page: page_state,
            phase: Phase::Ready,
            flights,
            suggestions,
            pinned,
            in_flight: None,
            ..self.clone()
        };

        // The list shrank under us (e.g. after a delete); follow to the last real page
        if page.page > page_state.total_pages {
            let (next, effect) = next.issue_fetch(true);
            return (next, Some(effect));
        }

        (next, None)
    }
}
