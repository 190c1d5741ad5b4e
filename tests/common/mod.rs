#![allow(dead_code)]

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use flight_console::FlightApi;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory flight directory behind a real HTTP listener
#[derive(Default)]
pub struct MockState {
    pub flights: Vec<Value>,
    pub next_id: i64,
    pub page_size: usize,
    /// `"{METHOD} {path}"` for every request received
    pub requests: Vec<String>,
    /// Bodies of POST, PUT and PATCH requests in arrival order
    pub bodies: Vec<Value>,
    /// Answer list requests with a JSON 500
    pub fail_list: bool,
}

pub type Shared = Arc<Mutex<MockState>>;

pub struct MockServer {
    pub state: Shared,
    pub base_url: String,
}

impl MockServer {
    pub fn api(&self) -> FlightApi {
        FlightApi::new(&self.base_url, Duration::from_secs(5)).unwrap()
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn bodies(&self) -> Vec<Value> {
        self.state.lock().unwrap().bodies.clone()
    }

    pub fn flight(&self, flight_id: i64) -> Option<Value> {
        let state = self.state.lock().unwrap();
        state.flights.iter().find(|f| f["flightID"] == flight_id).cloned()
    }
}

pub fn stored_flight(flight_id: i64, plane_id: i64, origin: i64, destination: i64, departure: &str) -> Value {
    json!({
        "flightID": flight_id,
        "planeID": plane_id,
        "originAirportID": origin,
        "destinationAirportID": destination,
        "airlineID": 1,
        "gate": format!("B{flight_id}"),
        "passengerCount": 100,
        "departureTime": departure,
    })
}

/// Five flights over three pages of two
pub fn sample_flights() -> Vec<Value> {
    vec![
        stored_flight(4, 1, 10, 11, "2026-02-20T12:00:00"),
        stored_flight(1, 1, 10, 12, "2026-02-20T09:30:00"),
        stored_flight(5, 2, 12, 10, "2026-02-21T18:45:00"),
        stored_flight(2, 2, 11, 10, "2026-02-20T15:00:00.000Z"),
        stored_flight(3, 1, 11, 12, "2026-02-22T07:10:00"),
    ]
}

pub async fn start_mock_server(flights: Vec<Value>) -> MockServer {
    let next_id = flights
        .iter()
        .filter_map(|f| f["flightID"].as_i64())
        .max()
        .unwrap_or(0)
        + 1;
    let state: Shared = Arc::new(Mutex::new(MockState {
        flights,
        next_id,
        page_size: 2,
        ..Default::default()
    }));

    let app = Router::new()
        .route("/api/flights", get(list_flights).post(create_flight).options(options_collection))
        .route(
            "/api/flights/{id}",
            get(get_flight)
                .put(replace_flight)
                .patch(patch_flight)
                .delete(delete_flight)
                .options(options_item),
        )
        .route("/api/planes", get(planes))
        .route("/api/airports", get(airports))
        .route("/api/airlines", get(airlines))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        state,
        base_url: format!("http://{addr}"),
    }
}

fn record(state: &Shared, entry: String) {
    state.lock().unwrap().requests.push(entry);
}

fn airport(id: i64) -> Value {
    match id {
        10 => json!({ "airportID": 10, "code": "YYZ", "city": "Toronto", "latitude": 43.6777, "longitude": -79.6248 }),
        11 => json!({ "airportID": 11, "code": "YVR", "city": "Vancouver", "latitude": 49.1967, "longitude": -123.1815 }),
        _ => json!({ "airportID": 12, "code": "YUL", "city": "Montreal" }),
    }
}

fn plane(id: i64) -> Value {
    match id {
        1 => json!({ "planeID": 1, "model": "CRJ900", "maxSeats": 120, "speed": 830 }),
        _ => json!({ "planeID": 2, "model": "A330", "maxSeats": 300, "speed": 870 }),
    }
}

fn summary(stored: &Value) -> Value {
    let origin = airport(stored["originAirportID"].as_i64().unwrap_or(0));
    let destination = airport(stored["destinationAirportID"].as_i64().unwrap_or(0));
    json!({
        "flightID": stored["flightID"],
        "airline": { "name": "Air Canada", "logoPath": "/img/ac.png" },
        "origin": { "code": origin["code"], "city": origin["city"] },
        "destination": { "code": destination["code"], "city": destination["city"] },
        "plane": plane(stored["planeID"].as_i64().unwrap_or(0))["model"],
        "gate": stored["gate"],
        "passengers": stored["passengerCount"],
        "departureTime": stored["departureTime"],
    })
}

async fn list_flights(State(state): State<Shared>, Query(params): Query<HashMap<String, String>>) -> Response {
    let query = {
        let mut pairs: Vec<_> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        pairs.sort();
        pairs.join("&")
    };
    record(&state, format!("GET /api/flights?{query}"));

    let state = state.lock().unwrap();
    if state.fail_list {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Database unavailable" })),
        )
            .into_response();
    }

    let search = params.get("search").map(|s| s.to_lowercase()).unwrap_or_default();
    let mut flights: Vec<Value> = state
        .flights
        .iter()
        .map(summary)
        .filter(|f| {
            search.is_empty()
                || [&f["origin"]["code"], &f["destination"]["code"], &f["origin"]["city"], &f["destination"]["city"]]
                    .iter()
                    .any(|v| v.as_str().unwrap_or("").to_lowercase().contains(&search))
        })
        .collect();
    flights.sort_by_key(|f| f["departureTime"].as_str().unwrap_or("").to_string());

    let page_size = state.page_size.max(1);
    let total_pages = flights.len().div_ceil(page_size).max(1);
    let page = params
        .get("page")
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, total_pages);
    let flights: Vec<Value> = flights.into_iter().skip((page - 1) * page_size).take(page_size).collect();

    Json(json!({ "flights": flights, "page": page, "totalPages": total_pages })).into_response()
}

async fn get_flight(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    record(&state, format!("GET /api/flights/{id}"));
    let state = state.lock().unwrap();
    match state.flights.iter().find(|f| f["flightID"] == id) {
        Some(flight) => Json(flight.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Flight not found").into_response(),
    }
}

async fn create_flight(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    record(&state, "POST /api/flights".to_string());
    let mut state = state.lock().unwrap();
    state.bodies.push(body.clone());

    let flight_id = state.next_id;
    state.next_id += 1;
    let mut stored = body;
    stored["flightID"] = json!(flight_id);
    state.flights.push(stored);

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Flight created", "flightID": flight_id })),
    )
        .into_response()
}

async fn replace_flight(State(state): State<Shared>, Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    record(&state, format!("PUT /api/flights/{id}"));
    let mut state = state.lock().unwrap();
    state.bodies.push(body.clone());
    match state.flights.iter_mut().find(|f| f["flightID"] == id) {
        Some(flight) => {
            let mut replaced = body;
            replaced["flightID"] = json!(id);
            *flight = replaced;
            Json(json!({ "message": "Flight updated" })).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Flight not found").into_response(),
    }
}

async fn patch_flight(State(state): State<Shared>, Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    record(&state, format!("PATCH /api/flights/{id}"));
    let mut state = state.lock().unwrap();
    state.bodies.push(body.clone());
    match state.flights.iter_mut().find(|f| f["flightID"] == id) {
        Some(flight) => {
            if let (Some(target), Some(fields)) = (flight.as_object_mut(), body.as_object()) {
                for (key, value) in fields {
                    target.insert(key.clone(), value.clone());
                }
            }
            "Flight patched".into_response()
        }
        None => (StatusCode::NOT_FOUND, "Flight not found").into_response(),
    }
}

async fn delete_flight(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    record(&state, format!("DELETE /api/flights/{id}"));
    let mut state = state.lock().unwrap();
    let before = state.flights.len();
    state.flights.retain(|f| f["flightID"] != id);
    if state.flights.len() == before {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response();
    }
    "Deleted".into_response()
}

async fn options_collection(State(state): State<Shared>) -> Response {
    record(&state, "OPTIONS /api/flights".to_string());
    let mut headers = HeaderMap::new();
    headers.insert(header::ALLOW, HeaderValue::from_static("GET, POST, OPTIONS"));
    (StatusCode::NO_CONTENT, headers).into_response()
}

async fn options_item(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    record(&state, format!("OPTIONS /api/flights/{id}"));
    StatusCode::NO_CONTENT.into_response()
}

async fn planes(State(state): State<Shared>) -> Response {
    record(&state, "GET /api/planes".to_string());
    Json(json!({ "planes": [plane(1), plane(2)] })).into_response()
}

async fn airports(State(state): State<Shared>) -> Response {
    record(&state, "GET /api/airports".to_string());
    Json(json!({ "airports": [airport(10), airport(11), airport(12)] })).into_response()
}

async fn airlines(State(state): State<Shared>) -> Response {
    record(&state, "GET /api/airlines".to_string());
    Json(json!({ "airlines": [{ "airlineID": 1, "name": "Air Canada" }] })).into_response()
}
