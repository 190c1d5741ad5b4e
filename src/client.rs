use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::models::{
    AirlineList, AirportList, FlightDetail, FlightId, FlightPage, FlightPatch, FlightPayload,
    FlightSummary, MutationResponse, PlaneList, ReferenceData,
};
use crate::view::ListQuery;
use indicatif::ProgressBar;
use reqwest::header::{ALLOW, CONTENT_TYPE};
use reqwest::{Method, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Client for the flight directory and reference data endpoints
#[derive(Debug, Clone)]
pub struct FlightApi {
    http: reqwest::Client,
    base: Url,
}

/// Result of an `OPTIONS` request
#[derive(Debug, Clone, PartialEq)]
pub struct AllowedMethods {
    pub path: String,
    pub status: u16,
    pub allow: Option<String>,
}

impl AllowedMethods {
    pub fn allow_text(&self) -> &str {
        self.allow.as_deref().unwrap_or("(no Allow header returned)")
    }
}

impl FlightApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base: parse_base(base_url)?,
        })
    }

    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        Self::new(&api.base_url, Duration::from_secs(api.timeout_secs.max(1)))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base.join(path.trim_start_matches('/')).map_err(|e| Error::Url {
            msg: format!("{path}: {e}"),
        })
    }

    /// `GET /api/flights` for one page of the list view
    pub async fn list_flights(&self, query: &ListQuery) -> Result<FlightPage> {
        let mut url = self.url("api/flights")?;
        url.query_pairs_mut().extend_pairs(query.to_pairs());

        tracing::debug!(%url, "Fetching flight page");
        let response = self.http.get(url).send().await?;
        let page: FlightPage = read_json(response).await?;
        tracing::debug!(
            page = page.page,
            total_pages = page.total_pages,
            count = page.flights.len(),
            "Fetched flight page"
        );
        Ok(page)
    }

    /// Every flight across all pages: page 1 first, then 2..=totalPages
    pub async fn fetch_all_flights(&self, progress: Option<&ProgressBar>) -> Result<Vec<FlightSummary>> {
        let first = self.list_flights(&ListQuery::page(1)).await?;
        let total_pages = first.total_pages.max(1);
        if let Some(pb) = progress {
            pb.set_length(u64::from(total_pages));
            pb.inc(1);
        }

        let mut flights = first.flights;
        for page in 2..=total_pages {
            let next = self.list_flights(&ListQuery::page(page)).await?;
            flights.extend(next.flights);
            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        tracing::debug!(total_pages, count = flights.len(), "Merged all flight pages");
        Ok(flights)
    }

    pub async fn get_flight(&self, flight_id: FlightId) -> Result<FlightDetail> {
        let url = self.url(&format!("api/flights/{flight_id}"))?;
        let response = self.http.get(url).send().await?;
        read_json(response).await
    }

    pub async fn create_flight(&self, payload: &FlightPayload) -> Result<MutationResponse> {
        let url = self.url("api/flights")?;
        tracing::info!(
            origin = payload.origin_airport_id,
            destination = payload.destination_airport_id,
            "Creating flight"
        );
        let response = self.http.post(url).json(payload).send().await?;
        read_mutation(response).await
    }

    /// `PUT`, every field replaced
    pub async fn replace_flight(&self, flight_id: FlightId, payload: &FlightPayload) -> Result<MutationResponse> {
        let url = self.url(&format!("api/flights/{flight_id}"))?;
        tracing::info!(flight_id, "Replacing flight");
        let response = self.http.put(url).json(payload).send().await?;
        read_mutation(response).await
    }

    /// `PATCH`, only the fields present in `patch`
    pub async fn patch_flight(&self, flight_id: FlightId, patch: &FlightPatch) -> Result<MutationResponse> {
        let url = self.url(&format!("api/flights/{flight_id}"))?;
        tracing::info!(flight_id, "Patching flight");
        let response = self.http.patch(url).json(patch).send().await?;
        read_mutation(response).await
    }

    pub async fn delete_flight(&self, flight_id: FlightId) -> Result<MutationResponse> {
        let url = self.url(&format!("api/flights/{flight_id}"))?;
        tracing::info!(flight_id, "Deleting flight");
        let response = self.http.delete(url).send().await?;
        read_mutation(response).await
    }

    pub async fn planes(&self) -> Result<PlaneList> {
        let response = self.http.get(self.url("api/planes")?).send().await?;
        read_json(response).await
    }

    pub async fn airports(&self) -> Result<AirportList> {
        let response = self.http.get(self.url("api/airports")?).send().await?;
        read_json(response).await
    }

    pub async fn airlines(&self) -> Result<AirlineList> {
        let response = self.http.get(self.url("api/airlines")?).send().await?;
        read_json(response).await
    }

    /// All three lookup lists, fetched concurrently
    pub async fn reference_data(&self) -> Result<ReferenceData> {
        let (planes, airports, airlines) =
            tokio::try_join!(self.planes(), self.airports(), self.airlines())?;
        Ok(ReferenceData {
            planes: planes.planes,
            airports: airports.airports,
            airlines: airlines.airlines,
        })
    }

    /// `OPTIONS {path}`; any status is reported, only transport failures error
    pub async fn allowed_methods(&self, path: &str) -> Result<AllowedMethods> {
        let url = self.url(path)?;
        let response = self.http.request(Method::OPTIONS, url).send().await?;
        let allow = response
            .headers()
            .get(ALLOW)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Ok(AllowedMethods {
            path: format!("/{}", path.trim_start_matches('/')),
            status: response.status().as_u16(),
            allow,
        })
    }
}

fn parse_base(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url.trim()).map_err(|e| Error::Url {
        msg: format!("{base_url}: {e}"),
    })?;
    if base.cannot_be_a_base() {
        return Err(Error::Url {
            msg: format!("{base_url}: not a base URL"),
        });
    }
    // Joined paths are relative, so the base must end in a slash
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(http_error(response).await);
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// Mutation bodies may be JSON or plain text; text becomes the message
async fn read_mutation(response: Response) -> Result<MutationResponse> {
    if !response.status().is_success() {
        return Err(http_error(response).await);
    }
    let status = response.status().as_u16();
    let json = is_json(&response);
    let body = response.text().await?;

    let mut parsed = if json {
        serde_json::from_str::<MutationResponse>(&body).unwrap_or_default()
    } else {
        MutationResponse::default()
    };
    if parsed.message.is_none() && !body.trim().is_empty() {
        parsed.message = Some(body.trim().to_string());
    }
    parsed.status = status;
    Ok(parsed)
}

async fn http_error(response: Response) -> Error {
    let status = response.status().as_u16();
    let json = is_json(&response);
    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, json, &body);
    tracing::debug!(status, %message, "Request failed");
    Error::Http { status, message }
}

/// Message for a failed response: `message` from a JSON body, else the
/// JSON re-serialized, else the raw text, else `HTTP {status}`
pub fn error_message(status: u16, json: bool, body: &str) -> String {
    let text = if json {
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => match value.get("message") {
                Some(serde_json::Value::String(m)) if !m.is_empty() => m.clone(),
                _ => value.to_string(),
            },
            Err(_) => body.to_string(),
        }
    } else {
        body.to_string()
    };

    if text.trim().is_empty() {
        format!("HTTP {status}")
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_json_message() {
        let msg = error_message(400, true, r#"{"message":"Gate is required.","code":7}"#);
        assert_eq!(msg, "Gate is required.");
    }

    #[test]
    fn test_error_message_serializes_json_without_message() {
        let msg = error_message(409, true, r#"{"error":"conflict"}"#);
        assert_eq!(msg, r#"{"error":"conflict"}"#);
    }

    #[test]
    fn test_error_message_plain_text_and_empty() {
        assert_eq!(error_message(404, false, "Flight not found"), "Flight not found");
        assert_eq!(error_message(500, false, ""), "HTTP 500");
        assert_eq!(error_message(502, true, "   "), "HTTP 502");
    }

    #[test]
    fn test_error_message_bad_json_falls_back_to_text() {
        assert_eq!(error_message(500, true, "<html>oops"), "<html>oops");
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let api = FlightApi::new("http://localhost:18080/console", Duration::from_secs(1)).unwrap();
        assert_eq!(api.url("api/flights").unwrap().as_str(), "http://localhost:18080/console/api/flights");
        let api = FlightApi::new("http://localhost:18080", Duration::from_secs(1)).unwrap();
        assert_eq!(api.url("/api/planes").unwrap().as_str(), "http://localhost:18080/api/planes");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = FlightApi::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, Error::Url { .. }));
    }

    #[test]
    fn test_allow_text_placeholder() {
        let probe = AllowedMethods {
            path: "/api/flights".to_string(),
            status: 204,
            allow: None,
        };
        assert_eq!(probe.allow_text(), "(no Allow header returned)");
    }
}
