//! Flight status and boarding progress derived from the departure time.

use crate::models::{FlightId, FlightSummary};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Boarding opens this long before departure
pub const BOARDING_WINDOW_MINUTES: i64 = 30;

fn boarding_window() -> Duration {
    Duration::minutes(BOARDING_WINDOW_MINUTES)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightStatus {
    OnTime,
    Boarding,
    Departed,
}

impl FlightStatus {
    pub fn text(&self) -> &'static str {
        match self {
            FlightStatus::OnTime => "ON TIME",
            FlightStatus::Boarding => "BOARDING",
            FlightStatus::Departed => "DEPARTED",
        }
    }

    /// Style class, stable across renders
    pub fn class(&self) -> &'static str {
        match self {
            FlightStatus::OnTime => "ontime",
            FlightStatus::Boarding => "boarding",
            FlightStatus::Departed => "departed",
        }
    }
}

impl std::fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

pub fn derive_status(departure: DateTime<Utc>, now: DateTime<Utc>) -> FlightStatus {
    if now > departure {
        FlightStatus::Departed
    } else if departure - now < boarding_window() {
        FlightStatus::Boarding
    } else {
        FlightStatus::OnTime
    }
}

/// 0 at boarding open, 1 at departure, clamped outside that window
pub fn derive_progress(departure: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let window = boarding_window();
    let opened = departure - window;
    let elapsed = (now - opened).num_milliseconds() as f64;
    (elapsed / window.num_milliseconds() as f64).clamp(0.0, 1.0)
}

/// Server-supplied progress when present, otherwise the local estimate
pub fn flight_progress(flight: &FlightSummary, now: DateTime<Utc>) -> f64 {
    match flight.progress {
        Some(p) if p.is_finite() => p.clamp(0.0, 1.0),
        _ => derive_progress(flight.departure_time, now),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardStatus {
    pub status: FlightStatus,
    /// Whole percent, so sub-percent drift does not count as a change
    pub progress_pct: u8,
}

impl CardStatus {
    pub fn of(flight: &FlightSummary, now: DateTime<Utc>) -> Self {
        Self {
            status: derive_status(flight.departure_time, now),
            progress_pct: (flight_progress(flight, now) * 100.0).round() as u8,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub flight_id: FlightId,
    pub previous: Option<CardStatus>,
    pub current: CardStatus,
}

/// Last rendered status per card, for in-place updates on each tick
#[derive(Debug, Clone, Default)]
pub struct LiveBoard {
    rendered: HashMap<FlightId, CardStatus>,
}

impl LiveBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute every card and return only the ones whose status or progress moved.
    /// Cards no longer in `flights` are forgotten.
    pub fn tick(&mut self, flights: &[FlightSummary], now: DateTime<Utc>) -> Vec<StatusChange> {
        let mut next = HashMap::with_capacity(flights.len());
        let mut changes = Vec::new();

        for flight in flights {
            let current = CardStatus::of(flight, now);
            let previous = self.rendered.get(&flight.flight_id).copied();
            if previous != Some(current) {
                changes.push(StatusChange {
                    flight_id: flight.flight_id,
                    previous,
                    current,
                });
            }
            next.insert(flight.flight_id, current);
        }

        self.rendered = next;
        changes
    }

    pub fn get(&self, flight_id: FlightId) -> Option<CardStatus> {
        self.rendered.get(&flight_id).copied()
    }

    pub fn len(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rendered.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::testing;
    use chrono::TimeZone;

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 20, 12, 0, 0).unwrap()
    }

    fn flight(id: FlightId, departure: DateTime<Utc>) -> FlightSummary {
        FlightSummary {
            departure_time: departure,
            ..testing::flight(id, "YYZ", "YVR")
        }
    }

    #[test]
    fn test_status_examples() {
        assert_eq!(derive_status(t(), t() - Duration::minutes(10)), FlightStatus::Boarding);
        assert_eq!(derive_status(t(), t() + Duration::minutes(1)), FlightStatus::Departed);
        assert_eq!(derive_status(t(), t() - Duration::minutes(40)), FlightStatus::OnTime);
    }

    #[test]
    fn test_status_boundaries() {
        // Exactly at departure is still boarding
        assert_eq!(derive_status(t(), t()), FlightStatus::Boarding);
        assert_eq!(
            derive_status(t(), t() + Duration::milliseconds(1)),
            FlightStatus::Departed
        );
        // Exactly 30 minutes out is not yet boarding
        assert_eq!(derive_status(t(), t() - Duration::minutes(30)), FlightStatus::OnTime);
        assert_eq!(
            derive_status(t(), t() - Duration::minutes(30) + Duration::seconds(1)),
            FlightStatus::Boarding
        );
    }

    #[test]
    fn test_status_text_and_class() {
        assert_eq!(FlightStatus::OnTime.text(), "ON TIME");
        assert_eq!(FlightStatus::Boarding.class(), "boarding");
        assert_eq!(FlightStatus::Departed.to_string(), "DEPARTED");
    }

    #[test]
    fn test_progress_clamped_at_boundaries() {
        assert_eq!(derive_progress(t(), t() - Duration::hours(2)), 0.0);
        assert_eq!(derive_progress(t(), t() - Duration::minutes(30)), 0.0);
        assert_eq!(derive_progress(t(), t() - Duration::minutes(15)), 0.5);
        assert_eq!(derive_progress(t(), t()), 1.0);
        assert_eq!(derive_progress(t(), t() + Duration::hours(3)), 1.0);
    }

    #[test]
    fn test_progress_monotonic_inside_window() {
        let mut last = 0.0;
        for secs in (0..=1800).step_by(7) {
            let now = t() - Duration::minutes(30) + Duration::seconds(secs);
            let p = derive_progress(t(), now);
            assert!(p >= last, "progress went backwards at {secs}s");
            assert!((0.0..=1.0).contains(&p));
            last = p;
        }
        assert!(last > 0.99);
    }

    #[test]
    fn test_server_progress_preferred_and_clamped() {
        let mut f = flight(1, t());
        f.progress = Some(0.25);
        assert_eq!(flight_progress(&f, t()), 0.25);
        f.progress = Some(1.7);
        assert_eq!(flight_progress(&f, t()), 1.0);
        f.progress = Some(f64::NAN);
        assert_eq!(flight_progress(&f, t()), 1.0);
    }

    #[test]
    fn test_live_board_reports_only_changes() {
        let flights = vec![flight(1, t()), flight(2, t() + Duration::hours(5))];
        let mut board = LiveBoard::new();

        let first = board.tick(&flights, t() - Duration::minutes(40));
        assert_eq!(first.len(), 2);
        assert!(first.iter().all(|c| c.previous.is_none()));

        // Nothing moves within the same minute far from boarding
        let second = board.tick(&flights, t() - Duration::minutes(40) + Duration::seconds(5));
        assert!(second.is_empty());

        // Flight 1 starts boarding, flight 2 is unchanged
        let third = board.tick(&flights, t() - Duration::minutes(10));
        assert_eq!(third.len(), 1);
        assert_eq!(third[0].flight_id, 1);
        assert_eq!(third[0].previous.unwrap().status, FlightStatus::OnTime);
        assert_eq!(third[0].current.status, FlightStatus::Boarding);
        assert_eq!(board.get(2).unwrap().status, FlightStatus::OnTime);
    }

    #[test]
    fn test_live_board_forgets_removed_cards() {
        let mut board = LiveBoard::new();
        board.tick(&[flight(1, t()), flight(2, t())], t());
        assert_eq!(board.len(), 2);
        board.tick(&[flight(2, t())], t());
        assert_eq!(board.len(), 1);
        assert!(board.get(1).is_none());
    }
}
