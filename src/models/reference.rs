use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    #[serde(rename = "planeID")]
    pub plane_id: i64,
    pub model: String,
    #[serde(rename = "maxSeats")]
    pub max_seats: u32,
    /// Cruise speed in km/h
    #[serde(default, alias = "speedKmh", skip_serializing_if = "Option::is_none")]
    pub speed: Option<u32>,
}

impl Plane {
    pub fn label(&self) -> String {
        format!("{} (seats {})", self.model, self.max_seats)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    #[serde(rename = "airportID")]
    pub airport_id: i64,
    pub code: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Airport {
    pub fn label(&self) -> String {
        format!("{} - {}", self.code, self.city)
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airline {
    #[serde(rename = "airlineID")]
    pub airline_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaneList {
    #[serde(default)]
    pub planes: Vec<Plane>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirportList {
    #[serde(default)]
    pub airports: Vec<Airport>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirlineList {
    #[serde(default)]
    pub airlines: Vec<Airline>,
}

/// Lookup lists backing the form dropdowns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    pub planes: Vec<Plane>,
    pub airports: Vec<Airport>,
    pub airlines: Vec<Airline>,
}

impl ReferenceData {
    pub fn plane(&self, plane_id: i64) -> Option<&Plane> {
        self.planes.iter().find(|p| p.plane_id == plane_id)
    }

    pub fn airport(&self, airport_id: i64) -> Option<&Airport> {
        self.airports.iter().find(|a| a.airport_id == airport_id)
    }

    pub fn airline(&self, airline_id: i64) -> Option<&Airline> {
        self.airlines.iter().find(|a| a.airline_id == airline_id)
    }

    pub fn max_seats(&self, plane_id: i64) -> Option<u32> {
        self.plane(plane_id).map(|p| p.max_seats)
    }
}
