use super::errors::TranslationError;
use super::topic::Topic;
use super::{catalog, fields, search};
use crate::domain::user::{RegistrationRequest, UpdateRequest};
use crate::ingestion::Payload;

/// Payload field carrying the target of a deactivation event
const DEACTIVATION_ID_FIELD: &str = "id";

pub fn to_registration_request(
    topic: &str,
    payload: &Payload,
) -> Result<RegistrationRequest, TranslationError> {
    match Topic::parse(topic)? {
        Topic::Search => search::to_registration(payload),
        Topic::Catalog => catalog::to_registration(payload),
    }
}

pub fn to_update_request(topic: &str, payload: &Payload) -> Result<UpdateRequest, TranslationError> {
    match Topic::parse(topic)? {
        Topic::Search => search::to_update(payload),
        Topic::Catalog => catalog::to_update(payload),
    }
}

/// User id a deactivation event targets. Same field for every topic.
pub fn deactivation_target(payload: &Payload) -> Result<i64, TranslationError> {
    fields::user_id(payload, DEACTIVATION_ID_FIELD)
}
