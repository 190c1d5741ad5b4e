//! Create and update forms: draft values, field selection and validation.
//!
//! A [`FlightDraft`] holds what the user typed. Submitting turns it into a
//! [`FlightPayload`] (create, full replace) or a [`FlightPatch`] (partial
//! update). Validation rules run in a fixed order and the first failure wins;
//! a failed check never produces a request.

use crate::error::{Error, Result};
use crate::models::{FlightDetail, FlightId, FlightPatch, FlightPayload, ReferenceData};
use crate::timeutil;
use chrono::{DateTime, Local, TimeZone, Utc};
use std::collections::BTreeSet;

pub const MSG_DROPDOWNS: &str = "Please fill out all dropdowns.";
pub const MSG_SAME_AIRPORT: &str = "Origin and destination must be different.";
pub const MSG_GATE: &str = "Gate is required.";
pub const MSG_PASSENGERS: &str = "Passenger count must be 0 or more.";
pub const MSG_DEPARTURE: &str = "Departure time is required.";
pub const MSG_NO_FIELDS: &str = "Select at least one field to update.";
pub const MSG_NO_FLIGHT: &str = "Choose a flight first.";
pub const MSG_NOT_LOADED: &str = "Flight details not loaded yet.";

pub fn max_seats_message(max_seats: u32) -> String {
    format!("Passenger count cannot exceed max seats ({max_seats}).")
}

/// One editable column of a flight record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Plane,
    Origin,
    Destination,
    Airline,
    Gate,
    PassengerCount,
    DepartureTime,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Plane,
        Field::Origin,
        Field::Destination,
        Field::Airline,
        Field::Gate,
        Field::PassengerCount,
        Field::DepartureTime,
    ];

    /// JSON key in request bodies
    pub fn key(&self) -> &'static str {
        match self {
            Field::Plane => "planeID",
            Field::Origin => "originAirportID",
            Field::Destination => "destinationAirportID",
            Field::Airline => "airlineID",
            Field::Gate => "gate",
            Field::PassengerCount => "passengerCount",
            Field::DepartureTime => "departureTime",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        let short = match wanted.as_str() {
            "plane" => Some(Field::Plane),
            "origin" => Some(Field::Origin),
            "destination" | "dest" => Some(Field::Destination),
            "airline" => Some(Field::Airline),
            "passengers" => Some(Field::PassengerCount),
            "departure" => Some(Field::DepartureTime),
            _ => None,
        };
        short
            .or_else(|| {
                Field::ALL
                    .into_iter()
                    .find(|f| f.key().to_ascii_lowercase() == wanted)
            })
            .ok_or_else(|| format!("unknown field '{}'", s.trim()))
    }
}

/// Which fields a partial update sends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection(BTreeSet<Field>);

impl FieldSelection {
    pub fn all() -> Self {
        Self(Field::ALL.into_iter().collect())
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, selected: bool) {
        if selected {
            self.0.insert(field);
        } else {
            self.0.remove(&field);
        }
    }

    pub fn toggle(&mut self, field: Field) {
        let selected = self.contains(field);
        self.set(field, !selected);
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_all(&self) -> bool {
        self.0.len() == Field::ALL.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Field> for FieldSelection {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Raw form input. Dropdowns hold an ID or nothing; the two free-text
/// inputs keep what was typed so missing and malformed values stay distinct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlightDraft {
    pub plane_id: Option<i64>,
    pub origin_airport_id: Option<i64>,
    pub destination_airport_id: Option<i64>,
    pub airline_id: Option<i64>,
    pub gate: String,
    pub passenger_count: String,
    /// Local wall-clock time, `YYYY-MM-DDTHH:MM`
    pub departure_time: String,
}

impl FlightDraft {
    /// Fill the form from a loaded record, departure shown in `tz`
    pub fn from_detail_in<Tz: TimeZone>(detail: &FlightDetail, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self {
            plane_id: Some(detail.plane_id),
            origin_airport_id: Some(detail.origin_airport_id),
            destination_airport_id: Some(detail.destination_airport_id),
            airline_id: Some(detail.airline_id),
            gate: detail.gate.clone(),
            passenger_count: detail.passenger_count.to_string(),
            departure_time: detail
                .departure_time
                .with_timezone(tz)
                .format("%Y-%m-%dT%H:%M")
                .to_string(),
        }
    }

    pub fn from_detail(detail: &FlightDetail) -> Self {
        Self::from_detail_in(detail, &Local)
    }

    fn read_in<Tz: TimeZone>(&self, tz: &Tz) -> Candidate {
        let passengers = self.passenger_count.trim();
        let departure = self.departure_time.trim();
        Candidate {
            plane_id: self.plane_id,
            origin_airport_id: self.origin_airport_id,
            destination_airport_id: self.destination_airport_id,
            airline_id: self.airline_id,
            gate: self.gate.trim().to_string(),
            passenger_count: passengers.parse::<i64>().ok(),
            departure_time: if departure.is_empty() {
                None
            } else {
                timeutil::parse_input_in(departure, tz).ok()
            },
        }
    }
}

/// Normalised form values; `None` is a missing or unparseable input
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    plane_id: Option<i64>,
    origin_airport_id: Option<i64>,
    destination_airport_id: Option<i64>,
    airline_id: Option<i64>,
    gate: String,
    passenger_count: Option<i64>,
    departure_time: Option<DateTime<Utc>>,
}

impl Candidate {
    fn from_detail(detail: &FlightDetail) -> Self {
        Self {
            plane_id: Some(detail.plane_id),
            origin_airport_id: Some(detail.origin_airport_id),
            destination_airport_id: Some(detail.destination_airport_id),
            airline_id: Some(detail.airline_id),
            gate: detail.gate.trim().to_string(),
            passenger_count: Some(detail.passenger_count),
            departure_time: Some(detail.departure_time),
        }
    }

    /// Selected fields from `self` over everything else from `base`
    fn merged_over(self, base: Candidate, selection: &FieldSelection) -> Candidate {
        let pick = |field| selection.contains(field);
        Candidate {
            plane_id: if pick(Field::Plane) { self.plane_id } else { base.plane_id },
            origin_airport_id: if pick(Field::Origin) {
                self.origin_airport_id
            } else {
                base.origin_airport_id
            },
            destination_airport_id: if pick(Field::Destination) {
                self.destination_airport_id
            } else {
                base.destination_airport_id
            },
            airline_id: if pick(Field::Airline) { self.airline_id } else { base.airline_id },
            gate: if pick(Field::Gate) { self.gate } else { base.gate },
            passenger_count: if pick(Field::PassengerCount) {
                self.passenger_count
            } else {
                base.passenger_count
            },
            departure_time: if pick(Field::DepartureTime) {
                self.departure_time
            } else {
                base.departure_time
            },
        }
    }

    fn validate(self, reference: &ReferenceData) -> Result<FlightPayload> {
        let chosen = |id: Option<i64>| id.filter(|v| *v > 0);
        let (Some(plane_id), Some(origin_airport_id), Some(destination_airport_id), Some(airline_id)) = (
            chosen(self.plane_id),
            chosen(self.origin_airport_id),
            chosen(self.destination_airport_id),
            chosen(self.airline_id),
        ) else {
            return Err(Error::validation(MSG_DROPDOWNS));
        };

        if origin_airport_id == destination_airport_id {
            return Err(Error::validation(MSG_SAME_AIRPORT));
        }
        if self.gate.is_empty() {
            return Err(Error::validation(MSG_GATE));
        }
        let passenger_count = match self.passenger_count {
            Some(n) if n >= 0 => n,
            _ => return Err(Error::validation(MSG_PASSENGERS)),
        };
        // Unknown planes skip the seat check
        if let Some(max_seats) = reference.max_seats(plane_id)
            && passenger_count > i64::from(max_seats)
        {
            return Err(Error::validation(max_seats_message(max_seats)));
        }
        let Some(departure_time) = self.departure_time else {
            return Err(Error::validation(MSG_DEPARTURE));
        };

        Ok(FlightPayload {
            plane_id,
            origin_airport_id,
            destination_airport_id,
            airline_id,
            gate: self.gate,
            passenger_count,
            departure_time,
        })
    }
}

/// Validate the add form in the given zone
pub fn create_payload_in<Tz: TimeZone>(
    draft: &FlightDraft,
    reference: &ReferenceData,
    tz: &Tz,
) -> Result<FlightPayload> {
    draft.read_in(tz).validate(reference)
}

pub fn create_payload(draft: &FlightDraft, reference: &ReferenceData) -> Result<FlightPayload> {
    create_payload_in(draft, reference, &Local)
}

/// Request chosen for an update submit
#[derive(Debug, Clone, PartialEq)]
pub enum UpdatePlan {
    /// Every field selected
    Replace(FlightPayload),
    /// Only the selected fields
    Patch(FlightPatch),
}

impl UpdatePlan {
    pub fn method(&self) -> &'static str {
        match self {
            UpdatePlan::Replace(_) => "PUT",
            UpdatePlan::Patch(_) => "PATCH",
        }
    }
}

fn patch_from(payload: FlightPayload, selection: &FieldSelection) -> FlightPatch {
    let pick = |field| selection.contains(field);
    FlightPatch {
        plane_id: pick(Field::Plane).then_some(payload.plane_id),
        origin_airport_id: pick(Field::Origin).then_some(payload.origin_airport_id),
        destination_airport_id: pick(Field::Destination).then_some(payload.destination_airport_id),
        airline_id: pick(Field::Airline).then_some(payload.airline_id),
        gate: pick(Field::Gate).then_some(payload.gate),
        passenger_count: pick(Field::PassengerCount).then_some(payload.passenger_count),
        departure_time: pick(Field::DepartureTime).then_some(payload.departure_time),
    }
}

/// State of the update page: chosen flight, its last loaded record,
/// the edited draft and the field checkboxes.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateForm {
    pub flight_id: Option<FlightId>,
    pub loaded: Option<FlightDetail>,
    pub draft: FlightDraft,
    pub selection: FieldSelection,
}

impl Default for UpdateForm {
    fn default() -> Self {
        Self {
            flight_id: None,
            loaded: None,
            draft: FlightDraft::default(),
            selection: FieldSelection::all(),
        }
    }
}

impl UpdateForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to another flight; its record must be loaded before submitting
    pub fn choose(&mut self, flight_id: Option<FlightId>) {
        if self.flight_id != flight_id {
            self.loaded = None;
        }
        self.flight_id = flight_id;
    }

    pub fn load_in<Tz: TimeZone>(&mut self, detail: FlightDetail, tz: &Tz)
    where
        Tz::Offset: std::fmt::Display,
    {
        self.flight_id = Some(detail.flight_id);
        self.draft = FlightDraft::from_detail_in(&detail, tz);
        self.loaded = Some(detail);
    }

    pub fn load(&mut self, detail: FlightDetail) {
        self.load_in(detail, &Local)
    }

    /// Restore the draft from the last loaded record; false when nothing is loaded
    pub fn reset_in<Tz: TimeZone>(&mut self, tz: &Tz) -> bool
    where
        Tz::Offset: std::fmt::Display,
    {
        match &self.loaded {
            Some(detail) => {
                self.draft = FlightDraft::from_detail_in(detail, tz);
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) -> bool {
        self.reset_in(&Local)
    }

    pub fn select_all(&mut self) {
        self.selection = FieldSelection::all();
    }

    pub fn select_none(&mut self) {
        self.selection = FieldSelection::none();
    }

    /// Validate and pick PUT or PATCH for the current draft
    pub fn plan_in<Tz: TimeZone>(
        &self,
        reference: &ReferenceData,
        tz: &Tz,
    ) -> Result<(FlightId, UpdatePlan)> {
        let flight_id = self.flight_id.ok_or_else(|| Error::validation(MSG_NO_FLIGHT))?;
        let loaded = self
            .loaded
            .as_ref()
            .ok_or_else(|| Error::validation(MSG_NOT_LOADED))?;
        if self.selection.is_empty() {
            return Err(Error::validation(MSG_NO_FIELDS));
        }

        let edited = self.draft.read_in(tz);
        if self.selection.is_all() {
            let payload = edited.validate(reference)?;
            return Ok((flight_id, UpdatePlan::Replace(payload)));
        }

        let effective = edited
            .merged_over(Candidate::from_detail(loaded), &self.selection)
            .validate(reference)?;
        Ok((flight_id, UpdatePlan::Patch(patch_from(effective, &self.selection))))
    }

    pub fn plan(&self, reference: &ReferenceData) -> Result<(FlightId, UpdatePlan)> {
        self.plan_in(reference, &Local)
    }
}
