//! Add, update and delete flows on top of the REST client.
//!
//! Each flow validates locally first; nothing is sent when a check fails or
//! a confirmation is declined.

use crate::client::FlightApi;
use crate::error::{Error, Result};
use crate::models::{FlightDetail, FlightId, MutationResponse, ReferenceData};
use crate::view::form::{self, FlightDraft, UpdateForm, UpdatePlan};
use crate::view::picker::FlightPicker;
use indicatif::ProgressBar;

/// Yes/no question put to the user before a destructive request
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Delete page selector over every flight. Nothing is selected unless
/// `restore` is still listed.
pub async fn delete_picker(
    api: &FlightApi,
    restore: Option<FlightId>,
    progress: Option<&ProgressBar>,
) -> Result<FlightPicker> {
    let flights = api.fetch_all_flights(progress).await?;
    Ok(FlightPicker::new(&flights, restore))
}

/// Update page selector; falls back to the first flight
pub async fn update_picker(
    api: &FlightApi,
    restore: Option<FlightId>,
    progress: Option<&ProgressBar>,
) -> Result<FlightPicker> {
    let flights = api.fetch_all_flights(progress).await?;
    Ok(FlightPicker::with_first_selected(&flights, restore))
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    Deleted { flight_id: FlightId, message: String },
    Declined,
}

/// Ask, then delete the picker's selection
pub async fn delete_selected(
    api: &FlightApi,
    picker: &FlightPicker,
    confirm: &mut impl Confirm,
) -> Result<DeleteOutcome> {
    let (Some(flight_id), Some(prompt)) = (picker.selected_id(), picker.confirm_prompt()) else {
        return Err(Error::validation(form::MSG_NO_FLIGHT));
    };

    if !confirm.confirm(&prompt) {
        tracing::info!(flight_id, "Delete declined");
        return Ok(DeleteOutcome::Declined);
    }

    api.delete_flight(flight_id).await?;
    Ok(DeleteOutcome::Deleted {
        flight_id,
        message: format!("Flight #{flight_id} deleted."),
    })
}

/// Validate the add form and `POST` it
pub async fn create(api: &FlightApi, draft: &FlightDraft, reference: &ReferenceData) -> Result<MutationResponse> {
    let payload = form::create_payload(draft, reference)?;
    api.create_flight(&payload).await
}

/// Fetch a record and fill the form with it
pub async fn load_into_form(api: &FlightApi, update: &mut UpdateForm, flight_id: FlightId) -> Result<()> {
    update.choose(Some(flight_id));
    let detail = api.get_flight(flight_id).await?;
    update.load(detail);
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub flight_id: FlightId,
    pub method: &'static str,
    pub message: String,
    /// Record as reloaded after the save
    pub detail: FlightDetail,
}

/// Validate, send `PUT` or `PATCH`, then reload the record into the form
pub async fn submit_update(
    api: &FlightApi,
    update: &mut UpdateForm,
    reference: &ReferenceData,
) -> Result<UpdateOutcome> {
    let (flight_id, plan) = update.plan(reference)?;
    let method = plan.method();
    tracing::info!(flight_id, method, "Saving flight");

    match &plan {
        UpdatePlan::Replace(payload) => api.replace_flight(flight_id, payload).await?,
        UpdatePlan::Patch(patch) => api.patch_flight(flight_id, patch).await?,
    };

    load_into_form(api, update, flight_id).await?;
    let detail = update
        .loaded
        .clone()
        .ok_or_else(|| Error::validation(form::MSG_NOT_LOADED))?;

    Ok(UpdateOutcome {
        flight_id,
        method,
        message: format!("Flight #{flight_id} updated successfully ({method})."),
        detail,
    })
}
