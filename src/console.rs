//! Interactive flight list session.
//!
//! Reads one command per line, feeds it through [`ListState::update`] and
//! runs the resulting fetch in the background. A [`RefreshTask`] re-fetches
//! the current page on every tick and cards whose status or progress moved
//! are reported in place.

use crate::client::FlightApi;
use crate::error::Result;
use crate::models::{FlightId, FlightSummary};
use crate::refresh::RefreshTask;
use crate::render;
use crate::timeutil;
use crate::view::status::StatusChange;
use crate::view::{Action, Effect, FilterState, ListState, LiveBoard, SortKey};
use crate::weather::WeatherClient;
use chrono::Utc;
use colored::Colorize;
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

pub const HELP: &str = "\
Commands:
  /TEXT       search (a bare / clears it)
  d DATE      filter by YYYY-MM-DD (a bare d clears it)
  s KEY       sort by status, departure or gate
  c           clear search, date and sort
  n, p        next or previous page
  g N         jump to page N
  pick N      choose suggestion N
  x           close the suggestion list
  r           refresh now
  q           quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Action(Action),
    Help,
    Quit,
}

/// Parse one input line; the error is the text to show the user
pub fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let line = line.trim();
    if let Some(search) = line.strip_prefix('/') {
        return Ok(Command::Action(Action::SetSearch(search.trim().to_string())));
    }

    let (word, arg) = match line.split_once(char::is_whitespace) {
        Some((word, arg)) => (word, arg.trim()),
        None => (line, ""),
    };

    let action = match (word, arg) {
        ("q" | "quit", _) => return Ok(Command::Quit),
        ("?" | "h" | "help", _) | ("", _) => return Ok(Command::Help),
        ("n" | "next", _) => Action::NextPage,
        ("p" | "prev", _) => Action::PrevPage,
        ("r" | "refresh", _) => Action::Refresh,
        ("c" | "clear", _) => Action::ClearFilters,
        ("x", _) => Action::DismissSuggestions,
        ("d" | "date", "") => Action::SetDate(None),
        ("d" | "date", date) => {
            let date = timeutil::parse_date(date).map_err(|e| e.to_string())?;
            Action::SetDate(Some(date))
        }
        ("s" | "sort", key) => Action::SetSort(key.parse::<SortKey>()?),
        ("g" | "page", n) => Action::GoToPage(parse_number(n)?),
        ("pick", n) => match parse_number(n)? {
            0 => return Err("Suggestions are numbered from 1".to_string()),
            n => Action::SelectSuggestion(n as usize - 1),
        },
        (other, _) => return Err(format!("Unknown command '{other}', type ? for help")),
    };
    Ok(Command::Action(action))
}

fn parse_number(value: &str) -> std::result::Result<u32, String> {
    value
        .parse::<u32>()
        .map_err(|_| format!("Expected a number, got '{value}'"))
}

#[derive(Debug)]
enum Event {
    Fetched(Action),
    Weather(HashMap<FlightId, String>),
}

pub struct ListSession<W> {
    api: FlightApi,
    weather: Option<WeatherClient>,
    refresh_period: Duration,
    out: W,
}

impl<W: Write> ListSession<W> {
    pub fn new(api: FlightApi, weather: Option<WeatherClient>, refresh_period: Duration, out: W) -> Self {
        Self {
            api,
            weather,
            refresh_period,
            out,
        }
    }

    /// Run until `q` or end of input; returns the final state and the writer
    pub async fn run<R>(mut self, input: R, filter: FilterState, page: u32) -> Result<(ListState, W)>
    where
        R: AsyncBufRead + Unpin,
    {
        let (events_tx, mut events) = mpsc::unbounded_channel();
        let (mut state, effect) = ListState::init(filter, page);
        self.spawn_fetch(effect, &events_tx);

        let (refresh, mut ticks) = RefreshTask::spawn(self.refresh_period);
        let mut lines = input.lines();
        let mut board = LiveBoard::new();
        let mut weather: HashMap<FlightId, String> = HashMap::new();

        tracing::info!(
            refresh_secs = self.refresh_period.as_secs(),
            "Flight list session started"
        );
        self.draw(&state, &weather)?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match parse_command(&line) {
                        Ok(Command::Quit) => break,
                        Ok(Command::Help) => writeln!(self.out, "{HELP}")?,
                        // Manual refresh goes through the timer so the period restarts
                        Ok(Command::Action(Action::Refresh)) => refresh.tick_now().await,
                        Ok(Command::Action(action)) => {
                            state = self.dispatch(&state, action, &events_tx);
                            self.draw(&state, &weather)?;
                        }
                        Err(message) => writeln!(self.out, "{}", message.red())?,
                    }
                }
                Some(event) = events.recv() => match event {
                    Event::Fetched(action) => {
                        let before = state.clone();
                        state = self.dispatch(&state, action, &events_tx);
                        if state == before {
                            continue;
                        }
                        let now = Utc::now();
                        let visible = visible_owned(&state);
                        let changes = board.tick(&visible, now);

                        let redraw = before.flights != state.flights
                            || before.phase != state.phase
                            || before.page != state.page
                            || before.suggestions != state.suggestions
                            || before.pinned != state.pinned;
                        if redraw {
                            retain_listed(&mut weather, &state.flights);
                            self.spawn_weather(&visible, &weather, &events_tx);
                            self.draw(&state, &weather)?;
                        } else {
                            self.report_changes(&changes)?;
                        }
                    }
                    Event::Weather(found) => {
                        weather.extend(found);
                        // Lookups may finish after the page changed
                        retain_listed(&mut weather, &state.flights);
                        self.draw(&state, &weather)?;
                    }
                },
                Some(tick) = ticks.recv() => {
                    tracing::debug!(tick = tick.0, "Refresh tick");
                    state = self.dispatch(&state, Action::Refresh, &events_tx);
                    let changes = board.tick(&visible_owned(&state), Utc::now());
                    self.report_changes(&changes)?;
                }
            }
        }

        refresh.stop().await;
        tracing::info!("Flight list session ended");
        Ok((state, self.out))
    }

    fn dispatch(&self, state: &ListState, action: Action, events: &mpsc::UnboundedSender<Event>) -> ListState {
        let (next, effect) = state.update(action);
        if let Some(effect) = effect {
            self.spawn_fetch(effect, events);
        }
        next
    }

    fn spawn_fetch(&self, effect: Effect, events: &mpsc::UnboundedSender<Event>) {
        let Effect::FetchList { token, query } = effect;
        let api = self.api.clone();
        let events = events.clone();

        tokio::spawn(async move {
            let action = match api.list_flights(&query).await {
                Ok(page) => Action::FetchSucceeded { token, page },
                Err(e) => {
                    tracing::warn!(token, error = %e, "Flight list fetch failed");
                    Action::FetchFailed {
                        token,
                        message: e.user_message(),
                    }
                }
            };
            // The session may already be gone
            let _ = events.send(Event::Fetched(action));
        });
    }

    /// Look up weather for cards that have none yet, reported in one batch
    fn spawn_weather(
        &self,
        flights: &[FlightSummary],
        known: &HashMap<FlightId, String>,
        events: &mpsc::UnboundedSender<Event>,
    ) {
        let Some(client) = self.weather.clone() else {
            return;
        };
        let wanted: Vec<(FlightId, Option<(f64, f64)>)> = flights
            .iter()
            .filter(|f| !known.contains_key(&f.flight_id))
            .map(|f| (f.flight_id, f.origin.coordinates()))
            .collect();
        if wanted.is_empty() {
            return;
        }

        let events = events.clone();
        tokio::spawn(async move {
            let mut lookups = JoinSet::new();
            for (flight_id, coordinates) in wanted {
                let client = client.clone();
                lookups.spawn(async move { (flight_id, client.describe(coordinates).await) });
            }

            let mut found = HashMap::new();
            while let Some(result) = lookups.join_next().await {
                match result {
                    Ok((flight_id, text)) => {
                        found.insert(flight_id, text);
                    }
                    Err(e) => tracing::debug!(error = %e, "Weather lookup task failed"),
                }
            }
            let _ = events.send(Event::Weather(found));
        });
    }

    fn draw(&mut self, state: &ListState, weather: &HashMap<FlightId, String>) -> Result<()> {
        writeln!(self.out, "{}", "─".repeat(60).bright_black())?;
        write!(self.out, "{}", render::list_view(state, Utc::now(), weather))?;
        self.out.flush()?;
        Ok(())
    }

    /// Only cards seen before; first sightings were part of the last full draw
    fn report_changes(&mut self, changes: &[StatusChange]) -> Result<()> {
        for change in changes.iter().filter(|c| c.previous.is_some()) {
            writeln!(self.out, "{}", render::status_change(change))?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Drop weather lines for flights no longer on the current page
fn retain_listed(weather: &mut HashMap<FlightId, String>, flights: &[FlightSummary]) {
    weather.retain(|id, _| flights.iter().any(|f| f.flight_id == *id));
}

fn visible_owned(state: &ListState) -> Vec<FlightSummary> {
    state.visible_flights().into_iter().cloned().collect()
}
