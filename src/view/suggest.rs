//! Search-as-you-type suggestion dropdown.

use crate::models::{FlightId, FlightSummary};

pub const MAX_SUGGESTIONS: usize = 6;

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub flight_id: FlightId,
    pub label: String,
}

/// `"{originCode} → {destinationCode}"`, also the text placed in the search box on selection
pub fn route_label(flight: &FlightSummary) -> String {
    format!("{} → {}", flight.origin.code, flight.destination.code)
}

/// Case-insensitive substring match over the fields shown on a card
pub fn matches(flight: &FlightSummary, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }

    let haystacks = [
        flight.flight_id.to_string(),
        flight.airline.name.to_lowercase(),
        flight.origin.code.to_lowercase(),
        flight.origin.city.to_lowercase(),
        flight.destination.code.to_lowercase(),
        flight.destination.city.to_lowercase(),
        flight.gate.to_lowercase(),
        flight.plane.to_lowercase(),
        route_label(flight).to_lowercase(),
    ];
    haystacks.iter().any(|h| h.contains(&needle))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionBox {
    pub open: bool,
    pub items: Vec<Suggestion>,
}

impl SuggestionBox {
    pub fn closed() -> Self {
        Self::default()
    }

    /// Dropdown for `search` over `flights`; empty search or no match hides it
    pub fn for_search(flights: &[FlightSummary], search: &str) -> Self {
        let items: Vec<Suggestion> = flights
            .iter()
            .filter(|f| matches(f, search))
            .take(MAX_SUGGESTIONS)
            .map(|f| Suggestion {
                flight_id: f.flight_id,
                label: format!("#{} {} • {}", f.flight_id, route_label(f), f.airline.name),
            })
            .collect();

        Self {
            open: !items.is_empty(),
            items,
        }
    }

    pub fn get(&self, index: usize) -> Option<&Suggestion> {
        if self.open { self.items.get(index) } else { None }
    }
}
