use super::errors::TranslationError;
use super::fields;
use crate::domain::user::{Address, RegistrationRequest, UpdateRequest};
use crate::ingestion::Payload;

// ============================================================================
// Catalog Topic Mapping
// ============================================================================
//
// The catalog module speaks its own vocabulary:
//
//   nombre -> firstName     estado -> state       piso         -> floor
//   apellido -> lastName    ciudad -> city        departamento -> apartment
//   telefono -> phoneNumber calle -> street       zonas        -> zones
//   id_prestador -> userId  numero -> number      habilidades  -> skills
//
// Address comes flattened and every catalog user is a provider.
//
// ============================================================================

/// Role assigned to every user registered from the catalog
pub const DEFAULT_CATALOG_ROLE: &str = "PROVIDER";

const USER_ID_FIELD: &str = "id_prestador";

/// (catalog key, canonical name) in the order they are reported
const REQUIRED_FOR_REGISTRATION: &[(&str, &str)] = &[
    ("email", "email"),
    ("password", "password"),
    ("nombre", "firstName"),
    ("apellido", "lastName"),
    ("telefono", "phoneNumber"),
    ("dni", "dni"),
    ("estado", "state"),
    ("ciudad", "city"),
    ("calle", "street"),
    ("numero", "number"),
];

fn missing_required(payload: &Payload) -> Vec<String> {
    REQUIRED_FOR_REGISTRATION
        .iter()
        .filter(|(key, _)| fields::text(payload, key).is_none())
        .map(|(_, canonical)| canonical.to_string())
        .collect()
}

fn flattened_address(payload: &Payload) -> Address {
    Address {
        state: fields::text(payload, "estado"),
        city: fields::text(payload, "ciudad"),
        street: fields::text(payload, "calle"),
        number: fields::text(payload, "numero"),
        floor: fields::text(payload, "piso"),
        apartment: fields::text(payload, "departamento"),
        ..Address::default()
    }
}

pub(super) fn to_registration(payload: &Payload) -> Result<RegistrationRequest, TranslationError> {
    let missing = missing_required(payload);
    if !missing.is_empty() {
        return Err(TranslationError::MissingFields(missing));
    }

    // Presence checked above
    let required = |key: &str| fields::text(payload, key).unwrap_or_default();

    Ok(RegistrationRequest {
        email: required("email"),
        password: required("password"),
        first_name: required("nombre"),
        last_name: required("apellido"),
        dni: required("dni"),
        phone_number: required("telefono"),
        role: DEFAULT_CATALOG_ROLE.to_string(),
        address: vec![flattened_address(payload)],
        zones: fields::list(payload, "zonas")?,
        skills: fields::list(payload, "habilidades")?,
    })
}

pub(super) fn to_update(payload: &Payload) -> Result<UpdateRequest, TranslationError> {
    let user_id = fields::user_id(payload, USER_ID_FIELD)?;

    let address = flattened_address(payload);
    let has_address = address.state.is_some()
        || address.city.is_some()
        || address.street.is_some()
        || address.number.is_some();

    Ok(UpdateRequest {
        email: fields::text(payload, "email"),
        password: fields::text(payload, "password"),
        first_name: fields::text(payload, "nombre"),
        last_name: fields::text(payload, "apellido"),
        phone_number: fields::text(payload, "telefono"),
        address: has_address.then(|| vec![address]),
        zones: fields::list(payload, "zonas")?,
        skills: fields::list(payload, "habilidades")?,
        ..UpdateRequest::for_user(user_id)
    })
}
