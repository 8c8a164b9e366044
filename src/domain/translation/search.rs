use serde_json::Value;

use super::errors::TranslationError;
use super::fields;
use crate::domain::user::{RegistrationRequest, UpdateRequest};
use crate::ingestion::Payload;

// "search" payloads already use the canonical field names; a straight
// structural conversion, no renaming.

pub(super) fn to_registration(payload: &Payload) -> Result<RegistrationRequest, TranslationError> {
    Ok(serde_json::from_value(Value::Object(payload.clone()))?)
}

pub(super) fn to_update(payload: &Payload) -> Result<UpdateRequest, TranslationError> {
    // Checked first so a missing target is reported as such, not as a serde error
    let user_id = fields::user_id(payload, "userId")?;

    let mut canonical = payload.clone();
    canonical.insert("userId".to_string(), Value::from(user_id));

    Ok(serde_json::from_value(Value::Object(canonical))?)
}
