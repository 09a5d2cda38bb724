//! Inbound call webhook
//!
//! The caller's telephony provider posts here once the question has been
//! recorded. The call is queued and acknowledged with empty TwiML right
//! away; answering happens on the call workers.

use application::InboundCall;
use axum::{
    Form,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use domain::{CallerId, LanguageTag};
use integration_twilio::{CallWebhookForm, empty_response};
use tracing::{info, instrument, warn};

use crate::{error::ApiError, state::AppState};

/// Convert the webhook form into a call for the pipeline
///
/// An unusable caller id becomes [`CallerId::unknown`] so the call still
/// gets processed and recorded; it just cannot be called back.
pub fn inbound_call(form: &CallWebhookForm) -> InboundCall {
    let caller = CallerId::new(form.caller()).unwrap_or_else(|e| {
        warn!(error = %e, "Unusable caller id, treating caller as unknown");
        CallerId::unknown()
    });
    let mut call = InboundCall::new(caller, form.recording().map(str::to_string));

    if let Some(sid) = form.call_sid() {
        call = call.with_call_sid(sid);
    }
    if let Some(hint) = form.language() {
        match LanguageTag::new(hint) {
            Ok(language) => call = call.with_language(language),
            Err(e) => warn!(hint, error = %e, "Ignoring unusable language hint"),
        }
    }
    call
}

/// `POST /webhook/call`
#[instrument(skip_all, fields(call_sid = form.call_sid()))]
pub async fn receive_call(
    State(state): State<AppState>,
    Form(form): Form<CallWebhookForm>,
) -> Result<Response, ApiError> {
    let call = inbound_call(&form);
    let caller = call.caller.clone();
    let has_recording = call.recording.is_some();

    state.dispatcher.submit(call)?;
    info!(%caller, has_recording, "Call queued");

    Ok(([(header::CONTENT_TYPE, "application/xml")], empty_response()).into_response())
}
