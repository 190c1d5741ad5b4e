use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use flight_console::console::{HELP, ListSession};
use flight_console::manage::{self, DeleteOutcome};
use flight_console::models::FlightId;
use flight_console::render;
use flight_console::view::form::{Field, FlightDraft, UpdateForm};
use flight_console::view::{Action, Effect, FilterState, ListState, SortKey};
use flight_console::weather::WeatherClient;
use flight_console::{Config, FlightApi, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::process;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const BIN_NAME: &str = env!("CARGO_BIN_NAME");

#[derive(Parser, Debug)]
#[command(name = BIN_NAME)]
#[command(about = "List, add, update and delete flights in the flight directory", long_about = None)]
#[command(version = VERSION)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Path to a config file (TOML)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Flight directory base URL, overrides the config file
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Color output mode (also respects NO_COLOR and FORCE_COLOR env vars)
    #[arg(
        long,
        visible_alias = "colour",
        value_enum,
        default_value = "auto",
        global = true
    )]
    color: ColorMode,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show one page of the flight list
    List {
        /// Search text
        #[arg(short = 'q', long, default_value = "")]
        search: String,
        /// Sort by status, departure or gate
        #[arg(short, long, default_value = "departure")]
        sort: SortKey,
        /// Only flights departing on this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Page number
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Output the raw page as JSON
        #[arg(short, long, conflicts_with = "watch")]
        json: bool,
        /// Look up current weather at each origin
        #[arg(short, long)]
        weather: bool,
        /// Stay open: read commands from stdin and refresh periodically
        #[arg(long)]
        watch: bool,
    },
    /// Show one flight record
    Show {
        flight_id: FlightId,
    },
    /// Add a flight
    Add {
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Update a flight; only the given fields are sent, all seven replace the record
    Update {
        /// Flight to update, defaults to the lowest ID
        flight_id: Option<FlightId>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a flight (confirmation required)
    Delete {
        /// Flight to delete; prompted for when omitted
        flight_id: Option<FlightId>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List planes, airports and airlines
    Lookups,
    /// Show the methods the flight endpoints allow
    Options,
}

#[derive(clap::Args, Debug, Default)]
struct FieldArgs {
    /// Plane ID
    #[arg(long)]
    plane: Option<i64>,
    /// Origin airport ID
    #[arg(long)]
    origin: Option<i64>,
    /// Destination airport ID
    #[arg(long)]
    destination: Option<i64>,
    /// Airline ID
    #[arg(long)]
    airline: Option<i64>,
    #[arg(long)]
    gate: Option<String>,
    #[arg(long)]
    passengers: Option<String>,
    /// Local departure time, YYYY-MM-DDTHH:MM
    #[arg(long)]
    departure: Option<String>,
}

impl FieldArgs {
    fn given(&self) -> Vec<Field> {
        let mut fields = Vec::new();
        let mut mark = |present: bool, field| {
            if present {
                fields.push(field);
            }
        };
        mark(self.plane.is_some(), Field::Plane);
        mark(self.origin.is_some(), Field::Origin);
        mark(self.destination.is_some(), Field::Destination);
        mark(self.airline.is_some(), Field::Airline);
        mark(self.gate.is_some(), Field::Gate);
        mark(self.passengers.is_some(), Field::PassengerCount);
        mark(self.departure.is_some(), Field::DepartureTime);
        fields
    }

    /// Overwrite the draft with every given value
    fn apply(self, draft: &mut FlightDraft) {
        if self.plane.is_some() {
            draft.plane_id = self.plane;
        }
        if self.origin.is_some() {
            draft.origin_airport_id = self.origin;
        }
        if self.destination.is_some() {
            draft.destination_airport_id = self.destination;
        }
        if self.airline.is_some() {
            draft.airline_id = self.airline;
        }
        if let Some(gate) = self.gate {
            draft.gate = gate;
        }
        if let Some(passengers) = self.passengers {
            draft.passenger_count = passengers;
        }
        if let Some(departure) = self.departure {
            draft.departure_time = departure;
        }
    }
}

#[tokio::main]
async fn main() {
    flight_console::init_tracing();
    tracing::debug!("{BIN_NAME} version {VERSION}");

    let args = Args::parse();
    configure_colors(args.color);

    let mut config = Config::load(args.config.as_deref()).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        process::exit(1);
    });
    if let Some(url) = args.api_url {
        config.api.base_url = url;
    }

    let api = FlightApi::from_config(&config.api).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid API settings");
        process::exit(1);
    });

    let (what, result) = match args.command {
        Commands::List {
            search,
            sort,
            date,
            page,
            json,
            weather,
            watch,
        } => {
            let filter = FilterState { search, date, sort };
            let result = if watch {
                run_watch(&api, &config, filter, page).await
            } else {
                run_list(&api, &config, filter, page, json, weather).await
            };
            ("List", result)
        }
        Commands::Show { flight_id } => ("Show", run_show(&api, flight_id).await),
        Commands::Add { fields } => ("Add", run_add(&api, fields).await),
        Commands::Update { flight_id, fields } => ("Update", run_update(&api, flight_id, fields).await),
        Commands::Delete { flight_id, yes } => ("Delete", run_delete(&api, flight_id, yes).await),
        Commands::Lookups => ("Lookups", run_lookups(&api).await),
        Commands::Options => ("Options", run_options(&api).await),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "{what} failed");
        eprintln!("{}", e.user_message().red());
        process::exit(1);
    }
}

fn configure_colors(mode: ColorMode) {
    // Check environment variables first (they take precedence)
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
        return;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        colored::control::set_override(true);
        return;
    }

    match mode {
        ColorMode::Auto => {}
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
    }
}

fn read_confirmation(prompt: &str) -> Result<String> {
    use std::io::Write;
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn pages_progress() -> ProgressBar {
    let progress = ProgressBar::new(1);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} Loading flights [{bar:30.cyan/blue}] {pos}/{len} pages")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress.set_style(style);
    progress
}

fn weather_client(config: &Config, wanted: bool) -> Result<Option<WeatherClient>> {
    if !wanted {
        return Ok(None);
    }
    WeatherClient::from_config(&config.weather, config.request_timeout())
}

async fn run_list(
    api: &FlightApi,
    config: &Config,
    filter: FilterState,
    page: u32,
    json: bool,
    weather: bool,
) -> Result<()> {
    let (state, Effect::FetchList { token, query }) = ListState::init(filter, page);
    let page = api.list_flights(&query).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }
    let (state, _) = state.update(Action::FetchSucceeded { token, page });

    let mut conditions = HashMap::new();
    if let Some(client) = weather_client(config, weather)? {
        for flight in state.visible_flights() {
            let text = client.describe(flight.origin.coordinates()).await;
            conditions.insert(flight.flight_id, text);
        }
    }

    print!("{}", render::list_view(&state, Utc::now(), &conditions));
    Ok(())
}

async fn run_watch(api: &FlightApi, config: &Config, filter: FilterState, page: u32) -> Result<()> {
    println!("{}", HELP.bright_black());
    let weather = weather_client(config, config.weather.enabled)?;
    let session = ListSession::new(api.clone(), weather, config.refresh_interval(), std::io::stdout());
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    session.run(stdin, filter, page).await?;
    Ok(())
}

async fn run_show(api: &FlightApi, flight_id: FlightId) -> Result<()> {
    let (detail, reference) = tokio::try_join!(api.get_flight(flight_id), api.reference_data())?;
    print!("{}", render::flight_detail(&detail, &reference));
    Ok(())
}

async fn run_add(api: &FlightApi, fields: FieldArgs) -> Result<()> {
    let reference = api.reference_data().await?;
    let mut draft = FlightDraft::default();
    fields.apply(&mut draft);

    let response = manage::create(api, &draft, &reference).await?;
    println!(
        "{}",
        format!(
            "Status {}: {}",
            response.status,
            response.message.as_deref().unwrap_or("")
        )
        .green()
        .bold()
    );
    if let Some(flight_id) = response.flight_id {
        println!("  {:>9}  {}", "Flight:".cyan().bold(), flight_id);
    }
    Ok(())
}

async fn run_update(api: &FlightApi, flight_id: Option<FlightId>, fields: FieldArgs) -> Result<()> {
    let reference = api.reference_data().await?;

    let flight_id = match flight_id {
        Some(id) => id,
        None => {
            let progress = pages_progress();
            let picker = manage::update_picker(api, None, Some(&progress)).await?;
            print!("{}", render::picker(&picker));
            match picker.selected_id() {
                Some(id) => id,
                None => return Ok(()),
            }
        }
    };

    let mut form = UpdateForm::new();
    manage::load_into_form(api, &mut form, flight_id).await?;
    tracing::info!(flight_id, "Flight loaded");

    form.selection = fields.given().into_iter().collect();
    fields.apply(&mut form.draft);

    let outcome = manage::submit_update(api, &mut form, &reference).await?;
    println!("{}", outcome.message.green().bold());
    print!("{}", render::flight_detail(&outcome.detail, &reference));

    // The list entry may have changed too (route, airline or departure)
    let picker = manage::update_picker(api, Some(outcome.flight_id), None).await?;
    if let Some(entry) = picker.selected() {
        println!("{}", entry.label().bright_black());
    }
    Ok(())
}

async fn run_delete(api: &FlightApi, flight_id: Option<FlightId>, yes: bool) -> Result<()> {
    let progress = pages_progress();
    let mut picker = manage::delete_picker(api, flight_id, Some(&progress)).await?;
    print!("{}", render::picker(&picker));

    if !picker.is_enabled() {
        return Ok(());
    }
    if let Some(id) = flight_id
        && picker.selected_id().is_none()
    {
        tracing::warn!(flight_id = id, "Flight is not in the list");
    }
    if picker.selected_id().is_none() {
        let answer = read_confirmation("Flight ID to delete: ")?;
        if let Ok(id) = answer.trim_start_matches('#').parse::<FlightId>() {
            picker.select(id);
        }
    }

    let mut confirm = |prompt: &str| {
        if yes {
            return true;
        }
        println!("{}", prompt.yellow().bold());
        matches!(
            read_confirmation("Type 'yes' to confirm: ").as_deref(),
            Ok("yes" | "y")
        )
    };

    match manage::delete_selected(api, &picker, &mut confirm).await? {
        DeleteOutcome::Deleted { message, .. } => {
            println!("{}", message.green().bold());
            let picker = manage::delete_picker(api, None, None).await?;
            print!("{}", render::picker(&picker));
        }
        DeleteOutcome::Declined => {
            println!("{}", "Aborted.".yellow().bold());
        }
    }
    Ok(())
}

async fn run_lookups(api: &FlightApi) -> Result<()> {
    let reference = api.reference_data().await?;

    println!("{}", "PLANES".cyan().bold());
    for plane in &reference.planes {
        println!("  {:>4}  {}", plane.plane_id.to_string().bright_black(), plane.label());
    }
    println!("{}", "AIRPORTS".cyan().bold());
    for airport in &reference.airports {
        println!("  {:>4}  {}", airport.airport_id.to_string().bright_black(), airport.label());
    }
    println!("{}", "AIRLINES".cyan().bold());
    for airline in &reference.airlines {
        println!("  {:>4}  {}", airline.airline_id.to_string().bright_black(), airline.name);
    }
    Ok(())
}

async fn run_options(api: &FlightApi) -> Result<()> {
    for path in ["/api/flights", "/api/flights/1"] {
        match api.allowed_methods(path).await {
            Ok(probe) => println!("{}\n", render::allowed_methods(&probe)),
            Err(e) => {
                tracing::warn!(path, error = %e, "OPTIONS request failed");
                println!("{}\n", "Error calling OPTIONS".red());
            }
        }
    }
    Ok(())
}
