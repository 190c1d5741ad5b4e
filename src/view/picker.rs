//! Flight selector shared by the delete and update pages.

use crate::models::{FlightId, FlightSummary};
use crate::timeutil;

pub const NO_FLIGHTS: &str = "No flights found";

#[derive(Debug, Clone, PartialEq)]
pub struct PickerOption {
    pub flight_id: FlightId,
    pub airline: String,
    pub route: String,
    /// Departure as `YYYY-MM-DD HH:MM`
    pub when: String,
}

impl PickerOption {
    pub fn of(flight: &FlightSummary) -> Self {
        let airline = match flight.airline.name.trim() {
            "" => "Unknown Airline".to_string(),
            name => name.to_string(),
        };
        let code = |c: &str| if c.is_empty() { "???".to_string() } else { c.to_string() };
        Self {
            flight_id: flight.flight_id,
            airline,
            route: format!("{} → {}", code(&flight.origin.code), code(&flight.destination.code)),
            when: timeutil::format_short(&flight.departure_time),
        }
    }

    /// `#{id} • {airline} • {origin} → {destination} • {YYYY-MM-DD HH:MM}`
    pub fn label(&self) -> String {
        format!("#{} • {} • {} • {}", self.flight_id, self.airline, self.route, self.when)
    }

    pub fn details(&self) -> String {
        format!("Selected: {} • {} • {}", self.airline, self.route, self.when)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlightPicker {
    options: Vec<PickerOption>,
    selected: Option<FlightId>,
}

impl FlightPicker {
    /// Options sorted by ascending ID. `restore` is reselected when still
    /// listed; otherwise nothing is selected.
    pub fn new(flights: &[FlightSummary], restore: Option<FlightId>) -> Self {
        let mut options: Vec<PickerOption> = flights.iter().map(PickerOption::of).collect();
        options.sort_by_key(|o| o.flight_id);
        options.dedup_by_key(|o| o.flight_id);

        let selected = restore.filter(|id| options.iter().any(|o| o.flight_id == *id));
        Self { options, selected }
    }

    /// Same as [`FlightPicker::new`] but falls back to the first option
    pub fn with_first_selected(flights: &[FlightSummary], restore: Option<FlightId>) -> Self {
        let mut picker = Self::new(flights, restore);
        if picker.selected.is_none() {
            picker.selected = picker.options.first().map(|o| o.flight_id);
        }
        picker
    }

    pub fn options(&self) -> &[PickerOption] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Select and delete/save controls are usable only with something to pick
    pub fn is_enabled(&self) -> bool {
        !self.options.is_empty()
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        self.is_empty().then_some(NO_FLIGHTS)
    }

    pub fn select(&mut self, flight_id: FlightId) -> bool {
        if self.options.iter().any(|o| o.flight_id == flight_id) {
            self.selected = Some(flight_id);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_id(&self) -> Option<FlightId> {
        self.selected
    }

    pub fn selected(&self) -> Option<&PickerOption> {
        let id = self.selected?;
        self.options.iter().find(|o| o.flight_id == id)
    }

    /// Prompt shown before a delete, `None` with nothing selected
    pub fn confirm_prompt(&self) -> Option<String> {
        self.selected()
            .map(|o| format!("Delete {}?\n\nThis cannot be undone.", o.label()))
    }
}
