//! Route estimates from airport coordinates and cruise speed.

use chrono::{DateTime, Duration, Utc};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres (haversine)
pub fn haversine_km(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64) -> f64 {
    let lat1 = lat1_deg.to_radians();
    let lat2 = lat2_deg.to_radians();
    let d_lat = (lat2_deg - lat1_deg).to_radians();
    let d_lon = (lon2_deg - lon1_deg).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Flight time in whole minutes, rounded up so short hops never show 0
pub fn duration_minutes(distance_km: f64, speed_kmh: u32) -> u32 {
    if speed_kmh == 0 {
        return 0;
    }
    let minutes = (distance_km / f64::from(speed_kmh) * 60.0).ceil();
    if minutes.is_finite() && minutes > 0.0 {
        minutes as u32
    } else {
        0
    }
}

/// `"{h}h {m}m"`
pub fn duration_text(minutes: u32) -> String {
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Distance and flying time between two airports
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteEstimate {
    pub distance_km: f64,
    pub minutes: u32,
}

impl RouteEstimate {
    /// From `(latitude, longitude)` pairs and a cruise speed
    pub fn between(from: (f64, f64), to: (f64, f64), speed_kmh: u32) -> Self {
        let distance_km = haversine_km(from.0, from.1, to.0, to.1);
        Self {
            distance_km,
            minutes: duration_minutes(distance_km, speed_kmh),
        }
    }

    pub fn duration_text(&self) -> String {
        duration_text(self.minutes)
    }

    pub fn arrival(&self, departure: DateTime<Utc>) -> DateTime<Utc> {
        departure + Duration::minutes(i64::from(self.minutes))
    }
}
