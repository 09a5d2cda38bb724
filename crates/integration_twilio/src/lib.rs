//! Twilio integration
//!
//! Sends SMS and places outbound voice calls through the Twilio REST API,
//! parses the call-status webhook form and renders the TwiML replies.

pub mod client;
pub mod twiml;
pub mod webhook;

pub use client::{CallResponse, MessageResponse, TwilioClient, TwilioConfig, TwilioError};
pub use twiml::{empty_response, play_response};
pub use webhook::CallWebhookForm;
