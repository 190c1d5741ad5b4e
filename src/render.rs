//! Terminal rendering of the view models.
//!
//! Every function returns a `String` so the console and the CLI decide where
//! it goes. Colors follow `colored`'s global override.

use crate::client::AllowedMethods;
use crate::geo::RouteEstimate;
use crate::models::{FlightDetail, FlightSummary, ReferenceData};
use crate::view::picker::FlightPicker;
use crate::view::state::{ListState, Phase};
use crate::view::status::{CardStatus, FlightStatus, StatusChange, derive_status, flight_progress};
use crate::view::{PageItem, PageState};
use chrono::{DateTime, Local, Utc};
use colored::{ColoredString, Colorize};
use std::collections::HashMap;
use std::fmt::Write;

const PROGRESS_WIDTH: usize = 20;

pub fn status_badge(status: FlightStatus) -> ColoredString {
    let text = status.text();
    match status {
        FlightStatus::OnTime => text.green().bold(),
        FlightStatus::Boarding => text.yellow().bold(),
        FlightStatus::Departed => text.bright_black().bold(),
    }
}

/// `[#########-----------]  45%`
pub fn progress_bar(fraction: f64) -> String {
    let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
    let filled = (fraction * PROGRESS_WIDTH as f64).round() as usize;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled).cyan(),
        "-".repeat(PROGRESS_WIDTH - filled).bright_black(),
        (fraction * 100.0).round() as u8
    )
}

fn local_time(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

/// One flight card; `weather` is the line shown under the route when known
pub fn flight_card(flight: &FlightSummary, now: DateTime<Utc>, weather: Option<&str>) -> String {
    let status = derive_status(flight.departure_time, now);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {}  {}",
        format!("#{}", flight.flight_id).bright_black(),
        flight.airline.name.bold(),
        status_badge(status)
    );
    let _ = writeln!(
        out,
        "  {} ({}) → {} ({})",
        flight.origin.city,
        flight.origin.code.cyan(),
        flight.destination.city,
        flight.destination.code.cyan()
    );

    let mut meta = format!(
        "  {} | Gate {} | Plane {} | {} passengers",
        local_time(&flight.departure_time),
        flight.gate,
        flight.plane,
        flight.passengers
    );
    if let Some(duration) = &flight.duration_text {
        let _ = write!(meta, " | {duration}");
    }
    let _ = writeln!(out, "{meta}");
    let _ = writeln!(out, "  {}", progress_bar(flight_progress(flight, now)));

    if let Some(weather) = weather {
        let _ = writeln!(out, "  {}", weather.bright_black());
    }
    out
}

/// `‹ Prev  1 … 4 [5] 6 … 20  Next ›`, disabled ends dimmed
pub fn pagination_bar(page: &PageState) -> String {
    let prev = if page.has_prev() {
        "‹ Prev".normal()
    } else {
        "‹ Prev".bright_black()
    };
    let next = if page.has_next() {
        "Next ›".normal()
    } else {
        "Next ›".bright_black()
    };

    let items: Vec<String> = page
        .window()
        .into_iter()
        .map(|item| match item {
            PageItem::Page(n) if n == page.current_page => format!("[{n}]").bold().to_string(),
            PageItem::Page(n) => n.to_string(),
            PageItem::Ellipsis => "…".to_string(),
        })
        .collect();

    format!("{prev}  {}  {next}", items.join(" "))
}

pub fn status_line(state: &ListState) -> String {
    match &state.phase {
        Phase::Loading => "Loading flights...".bright_black().to_string(),
        Phase::Error(message) => message.red().to_string(),
        Phase::Ready => {
            let shown = state.visible_flights().len();
            format!(
                "{} flight(s), page {} of {}",
                shown, state.page.current_page, state.page.total_pages
            )
        }
    }
}

/// The whole list page: filters, dropdown, cards and pagination
pub fn list_view(state: &ListState, now: DateTime<Utc>, weather: &HashMap<i64, String>) -> String {
    let mut out = String::new();

    let date = state
        .filter
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "any".to_string());
    let _ = writeln!(
        out,
        "{} {}  {} {}  {} {}",
        "Search:".cyan().bold(),
        state.search_text(),
        "Date:".cyan().bold(),
        date,
        "Sort:".cyan().bold(),
        state.filter.sort.as_str()
    );

    if state.suggestions.open {
        for (i, suggestion) in state.suggestions.items.iter().enumerate() {
            let _ = writeln!(out, "  {} {}", format!("{}.", i + 1).bright_black(), suggestion.label);
        }
    }
    let _ = writeln!(out);

    if state.is_empty() {
        let _ = writeln!(out, "{}", "No flights found.".yellow());
    } else {
        for flight in state.visible_flights() {
            let weather = weather.get(&flight.flight_id).map(String::as_str);
            let _ = writeln!(out, "{}", flight_card(flight, now, weather));
        }
    }

    let _ = writeln!(out, "{}", pagination_bar(&state.page));
    let _ = writeln!(out, "{}", status_line(state));
    out
}

/// In-place update for a card whose status or progress moved
pub fn status_change(change: &StatusChange) -> String {
    let CardStatus {
        status,
        progress_pct,
    } = change.current;
    let arrow = match change.previous {
        Some(previous) if previous.status != status => {
            format!("{} → ", previous.status.text().bright_black())
        }
        _ => String::new(),
    };
    format!(
        "{} {}{}  {}",
        format!("#{}", change.flight_id).bright_black(),
        arrow,
        status_badge(status),
        progress_bar(f64::from(progress_pct) / 100.0)
    )
}

/// Numbered options with the selection marked, or the disabled placeholder
pub fn picker(picker: &FlightPicker) -> String {
    if let Some(placeholder) = picker.placeholder() {
        return format!("{} {}\n", placeholder.yellow(), "(disabled)".bright_black());
    }

    let selected = picker.selected_id();
    let mut out = String::new();
    for option in picker.options() {
        let marker = if Some(option.flight_id) == selected { ">" } else { " " };
        let _ = writeln!(out, "{} {}", marker.green().bold(), option.label());
    }
    if let Some(option) = picker.selected() {
        let _ = writeln!(out, "\n{}", option.details().bright_black());
    }
    out
}

/// Raw record with lookup labels and a route estimate when coordinates and speed are known
pub fn flight_detail(detail: &FlightDetail, reference: &ReferenceData) -> String {
    let mut out = String::new();
    let plane = reference.plane(detail.plane_id);
    let origin = reference.airport(detail.origin_airport_id);
    let destination = reference.airport(detail.destination_airport_id);

    let label = |known: Option<String>, id: i64| known.unwrap_or_else(|| format!("#{id}"));

    let _ = writeln!(out, "{}", format!("Flight #{}", detail.flight_id).bold());
    let _ = writeln!(
        out,
        "  {:>11}  {}",
        "Airline:".cyan().bold(),
        label(reference.airline(detail.airline_id).map(|a| a.name.clone()), detail.airline_id)
    );
    let _ = writeln!(
        out,
        "  {:>11}  {}",
        "Plane:".cyan().bold(),
        label(plane.map(|p| p.label()), detail.plane_id)
    );
    let _ = writeln!(
        out,
        "  {:>11}  {}",
        "Origin:".cyan().bold(),
        label(origin.map(|a| a.label()), detail.origin_airport_id)
    );
    let _ = writeln!(
        out,
        "  {:>11}  {}",
        "Destination:".cyan().bold(),
        label(destination.map(|a| a.label()), detail.destination_airport_id)
    );
    let _ = writeln!(out, "  {:>11}  {}", "Gate:".cyan().bold(), detail.gate);
    let _ = writeln!(out, "  {:>11}  {}", "Passengers:".cyan().bold(), detail.passenger_count);
    let _ = writeln!(
        out,
        "  {:>11}  {}",
        "Departure:".cyan().bold(),
        local_time(&detail.departure_time)
    );

    let estimate = match (
        origin.and_then(|a| a.coordinates()),
        destination.and_then(|a| a.coordinates()),
        plane.and_then(|p| p.speed),
    ) {
        (Some(from), Some(to), Some(speed)) => Some(RouteEstimate::between(from, to, speed)),
        _ => None,
    };
    if let Some(estimate) = estimate {
        let _ = writeln!(
            out,
            "  {:>11}  {} ({:.0} km)",
            "Duration:".cyan().bold(),
            estimate.duration_text(),
            estimate.distance_km
        );
        let _ = writeln!(
            out,
            "  {:>11}  {}",
            "Arrival:".cyan().bold(),
            local_time(&estimate.arrival(detail.departure_time))
        );
    }
    out
}

pub fn allowed_methods(probe: &AllowedMethods) -> String {
    format!(
        "OPTIONS {}\nStatus: {}\nAllow: {}",
        probe.path,
        probe.status,
        probe.allow_text()
    )
}
