use crate::timeutil::{self, serde_utc};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

pub type FlightId = i64;

/// One card in the flight list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSummary {
    #[serde(rename = "flightID")]
    pub flight_id: FlightId,
    pub airline: AirlineRef,
    pub origin: AirportRef,
    pub destination: AirportRef,
    /// Plane label, e.g. "A320"
    #[serde(default)]
    pub plane: String,
    #[serde(default)]
    pub gate: String,
    #[serde(default, alias = "passengerCount")]
    pub passengers: u32,
    #[serde(with = "serde_utc")]
    pub departure_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_text: Option<String>,
    /// Server-supplied progress fraction, preferred over the local estimate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ServerStatus>,
}

/// Airline as embedded in a flight; older endpoints send just the name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AirlineWire")]
pub struct AirlineRef {
    pub name: String,
    #[serde(rename = "logoPath", skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AirlineWire {
    Name(String),
    Full {
        name: String,
        #[serde(rename = "logoPath", default)]
        logo_path: Option<String>,
    },
}

impl From<AirlineWire> for AirlineRef {
    fn from(wire: AirlineWire) -> Self {
        match wire {
            AirlineWire::Name(name) => AirlineRef {
                name,
                logo_path: None,
            },
            AirlineWire::Full { name, logo_path } => AirlineRef { name, logo_path },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportRef {
    pub code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl AirportRef {
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub text: String,
    pub class: String,
}

/// One page of `GET /api/flights`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightPage {
    #[serde(default)]
    pub flights: Vec<FlightSummary>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "first_page")]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

/// Raw record from `GET /api/flights/{id}`, the shape edited by the forms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightDetail {
    #[serde(rename = "flightID")]
    pub flight_id: FlightId,
    #[serde(rename = "planeID")]
    pub plane_id: i64,
    #[serde(rename = "originAirportID")]
    pub origin_airport_id: i64,
    #[serde(rename = "destinationAirportID")]
    pub destination_airport_id: i64,
    #[serde(rename = "airlineID")]
    pub airline_id: i64,
    #[serde(default)]
    pub gate: String,
    #[serde(rename = "passengerCount", default)]
    pub passenger_count: i64,
    #[serde(rename = "departureTime", with = "serde_utc")]
    pub departure_time: DateTime<Utc>,
}

/// Full body for `POST /api/flights` and `PUT /api/flights/{id}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightPayload {
    #[serde(rename = "planeID")]
    pub plane_id: i64,
    #[serde(rename = "originAirportID")]
    pub origin_airport_id: i64,
    #[serde(rename = "destinationAirportID")]
    pub destination_airport_id: i64,
    #[serde(rename = "airlineID")]
    pub airline_id: i64,
    pub gate: String,
    #[serde(rename = "passengerCount")]
    pub passenger_count: i64,
    #[serde(rename = "departureTime", with = "serde_utc")]
    pub departure_time: DateTime<Utc>,
}

/// Partial body for `PATCH /api/flights/{id}`; unset fields are omitted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlightPatch {
    #[serde(rename = "planeID", skip_serializing_if = "Option::is_none")]
    pub plane_id: Option<i64>,
    #[serde(rename = "originAirportID", skip_serializing_if = "Option::is_none")]
    pub origin_airport_id: Option<i64>,
    #[serde(rename = "destinationAirportID", skip_serializing_if = "Option::is_none")]
    pub destination_airport_id: Option<i64>,
    #[serde(rename = "airlineID", skip_serializing_if = "Option::is_none")]
    pub airline_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,
    #[serde(rename = "passengerCount", skip_serializing_if = "Option::is_none")]
    pub passenger_count: Option<i64>,
    #[serde(
        rename = "departureTime",
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_opt_utc"
    )]
    pub departure_time: Option<DateTime<Utc>>,
}

impl FlightPatch {
    pub fn is_empty(&self) -> bool {
        *self == FlightPatch::default()
    }
}

fn serialize_opt_utc<S: Serializer>(
    dt: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match dt {
        Some(dt) => serializer.serialize_str(&timeutil::format_utc(dt)),
        None => serializer.serialize_none(),
    }
}

/// Body returned by create/update/delete, when the server sends JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MutationResponse {
    /// HTTP status of the response, not part of the body
    #[serde(skip)]
    pub status: u16,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(rename = "flightID", default)]
    pub flight_id: Option<FlightId>,
}
