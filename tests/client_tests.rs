use flight_console::Error;
use flight_console::models::{FlightPatch, FlightPayload};
use flight_console::timeutil;
use flight_console::view::{FilterState, ListQuery, PageState, SortKey};
use serde_json::json;

mod common;
use common::{sample_flights, start_mock_server};

#[tokio::test]
async fn test_list_sends_filters_and_page() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_mock_server(sample_flights()).await;
    let api = server.api();

    let filter = FilterState {
        search: " yyz ".to_string(),
        date: chrono::NaiveDate::from_ymd_opt(2026, 2, 20),
        sort: SortKey::Gate,
    };
    let page = api.list_flights(&ListQuery::new(&filter, &PageState::new(1, 1))).await?;

    assert_eq!(page.page, 1);
    assert!(!page.flights.is_empty());
    assert!(page.flights.iter().all(|f| f.origin.code == "YYZ" || f.destination.code == "YYZ"));
    assert_eq!(
        server.requests(),
        vec!["GET /api/flights?date=2026-02-20&page=1&search=yyz&sort=gate".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn test_list_parses_summary_fields() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_mock_server(sample_flights()).await;
    let page = server.api().list_flights(&ListQuery::page(1)).await?;

    assert_eq!(page.total_pages, 3);
    let first = &page.flights[0];
    assert_eq!(first.flight_id, 1);
    assert_eq!(first.airline.name, "Air Canada");
    assert_eq!(first.origin.city, "Toronto");
    assert_eq!(first.plane, "CRJ900");
    assert_eq!(timeutil::format_utc(&first.departure_time), "2026-02-20T09:30:00Z");
    Ok(())
}

#[tokio::test]
async fn test_fetch_all_merges_every_page() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_mock_server(sample_flights()).await;
    let flights = server.api().fetch_all_flights(None).await?;

    let mut ids: Vec<_> = flights.iter().map(|f| f.flight_id).collect();
    ids.sort();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    assert_eq!(
        server.requests(),
        vec![
            "GET /api/flights?page=1&sort=departure".to_string(),
            "GET /api/flights?page=2&sort=departure".to_string(),
            "GET /api/flights?page=3&sort=departure".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_json_error_message_is_extracted() {
    let server = start_mock_server(sample_flights()).await;
    server.state.lock().unwrap().fail_list = true;

    let err = server.api().list_flights(&ListQuery::page(1)).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "Database unavailable");
}

#[tokio::test]
async fn test_text_and_json_without_message_errors() {
    let server = start_mock_server(sample_flights()).await;
    let api = server.api();

    let err = api.get_flight(99).await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.to_string(), "Flight not found");

    let err = api.delete_flight(99).await.unwrap_err();
    assert_eq!(err.to_string(), r#"{"error":"not found"}"#);
}

#[tokio::test]
async fn test_transport_failure() {
    // Bind and drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = flight_console::FlightApi::new(&format!("http://{addr}"), std::time::Duration::from_secs(2)).unwrap();
    let err = api.list_flights(&ListQuery::page(1)).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn test_create_replace_patch_round() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_mock_server(sample_flights()).await;
    let api = server.api();
    let departure = timeutil::parse_utc("2026-03-01T08:00:00Z")?;

    let payload = FlightPayload {
        plane_id: 2,
        origin_airport_id: 10,
        destination_airport_id: 11,
        airline_id: 1,
        gate: "C3".to_string(),
        passenger_count: 250,
        departure_time: departure,
    };
    let created = api.create_flight(&payload).await?;
    assert_eq!(created.status, 201);
    assert_eq!(created.message.as_deref(), Some("Flight created"));
    assert_eq!(created.flight_id, Some(6));

    let replaced = api
        .replace_flight(6, &FlightPayload { gate: "C4".to_string(), ..payload })
        .await?;
    assert_eq!(replaced.message.as_deref(), Some("Flight updated"));

    let patched = api
        .patch_flight(
            6,
            &FlightPatch {
                passenger_count: Some(260),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(patched.message.as_deref(), Some("Flight patched"));

    let bodies = server.bodies();
    assert_eq!(bodies[0]["departureTime"], "2026-03-01T08:00:00Z");
    assert_eq!(bodies[1]["gate"], "C4");
    assert_eq!(bodies[2], json!({ "passengerCount": 260 }));

    let detail = api.get_flight(6).await?;
    assert_eq!(detail.gate, "C4");
    assert_eq!(detail.passenger_count, 260);
    assert_eq!(detail.departure_time, departure);
    Ok(())
}

#[tokio::test]
async fn test_reference_data() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_mock_server(vec![]).await;
    let reference = server.api().reference_data().await?;

    assert_eq!(reference.planes.len(), 2);
    assert_eq!(reference.max_seats(1), Some(120));
    assert_eq!(reference.airport(10).map(|a| a.label()), Some("YYZ - Toronto".to_string()));
    assert_eq!(reference.airline(1).map(|a| a.name.as_str()), Some("Air Canada"));
    Ok(())
}

#[tokio::test]
async fn test_allowed_methods_probe() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_mock_server(vec![]).await;
    let api = server.api();

    let collection = api.allowed_methods("/api/flights").await?;
    assert_eq!(collection.status, 204);
    assert_eq!(collection.allow_text(), "GET, POST, OPTIONS");

    let item = api.allowed_methods("/api/flights/1").await?;
    assert_eq!(item.path, "/api/flights/1");
    assert_eq!(item.allow_text(), "(no Allow header returned)");
    Ok(())
}
