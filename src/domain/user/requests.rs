use serde::{Deserialize, Serialize};

use super::value_objects::{Address, PassthroughList};

// ============================================================================
// Canonical Requests
// ============================================================================
//
// Topic-independent input to the domain service. The "search" topic sends
// these shapes verbatim (camelCase on the wire); every other topic is
// mapped onto them by the translator.
//
// ============================================================================

#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub dni: String,
    pub phone_number: String,
    pub role: String,
    #[serde(default)]
    pub address: Vec<Address>,
    #[serde(default)]
    pub zones: PassthroughList,
    #[serde(default)]
    pub skills: PassthroughList,
}

/// Partial update: `None` leaves the stored value untouched
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Vec<Address>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub zones: PassthroughList,
    #[serde(default)]
    pub skills: PassthroughList,
}

impl UpdateRequest {
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id,
            email: None,
            password: None,
            first_name: None,
            last_name: None,
            phone_number: None,
            address: None,
            profile_image_url: None,
            role: None,
            zones: Vec::new(),
            skills: Vec::new(),
        }
    }
}

// Hand-written so passwords never reach the logs.
impl std::fmt::Debug for RegistrationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("dni", &self.dni)
            .field("phone_number", &self.phone_number)
            .field("role", &self.role)
            .field("address", &self.address)
            .field("zones", &self.zones)
            .field("skills", &self.skills)
            .finish()
    }
}

impl std::fmt::Debug for UpdateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateRequest")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("phone_number", &self.phone_number)
            .field("address", &self.address)
            .field("profile_image_url", &self.profile_image_url)
            .field("role", &self.role)
            .field("zones", &self.zones)
            .field("skills", &self.skills)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_output_masks_password() {
        let request = RegistrationRequest {
            email: "a@b.com".to_string(),
            password: "S3cret!pass".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            dni: "123".to_string(),
            phone_number: "555".to_string(),
            role: "CLIENTE".to_string(),
            address: vec![],
            zones: vec![],
            skills: vec![],
        };

        let rendered = format!("{:?}", request);
        assert!(!rendered.contains("S3cret"));
        assert!(rendered.contains("a@b.com"));

        let mut update = UpdateRequest::for_user(9);
        update.password = Some("S3cret!pass".to_string());
        assert!(!format!("{:?}", update).contains("S3cret"));
    }
}
