// ============================================================================
// Test Support - Recording Fakes for the Collaborator Seams
// ============================================================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use crate::domain::user::{
    RegistrationRequest, UpdateRequest, UserError, UserProjection, UserService,
};
use crate::ingestion::{Envelope, LedgerError, LedgerRecord, LedgerStore, Payload};
use crate::messaging::HubGateway;

pub fn payload(value: Value) -> Payload {
    value.as_object().cloned().expect("payload must be a JSON object")
}

pub fn envelope(message_id: &str, topic: &str, event_name: &str, body: Value) -> Envelope {
    Envelope::new(message_id, topic, event_name, payload(body))
}

pub fn search_registration(email: &str) -> Value {
    json!({
        "email": email,
        "password": "Passw0rd!",
        "firstName": "A",
        "lastName": "B",
        "dni": "123",
        "phoneNumber": "555",
        "role": "CLIENTE"
    })
}

// ============================================================================
// Fake UserService
// ============================================================================

/// In-memory user store with the same guards the real service has
#[derive(Default)]
pub struct FakeUserService {
    users: Mutex<HashMap<i64, UserProjection>>,
    next_id: AtomicUsize,
    fail_all: AtomicBool,
    delay_ms: AtomicU64,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub deactivate_calls: AtomicUsize,
}

impl FakeUserService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail as if the backing store were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.fail_all.store(unavailable, Ordering::SeqCst);
    }

    /// Hold every operation for `delay` before it touches the store
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn seed(&self, user_id: i64, email: &str, active: bool) {
        let user = UserProjection {
            user_id,
            email: email.to_string(),
            first_name: "Seed".to_string(),
            last_name: "User".to_string(),
            phone_number: None,
            dni: None,
            role: "CLIENTE".to_string(),
            active,
            address: vec![],
            profile_image_url: None,
        };
        self.users.lock().unwrap().insert(user_id, user);
    }

    pub fn get(&self, user_id: i64) -> Option<UserProjection> {
        self.users.lock().unwrap().get(&user_id).cloned()
    }

    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    async fn enter(&self) -> Result<(), UserError> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.fail_all.load(Ordering::SeqCst) {
            return Err(UserError::Invalid("user store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl UserService for FakeUserService {
    async fn create_user(&self, request: &RegistrationRequest) -> Result<UserProjection, UserError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;

        let mut users = self.users.lock().unwrap();
        let email = request.email.trim().to_lowercase();
        if users.values().any(|u| u.email == email) {
            return Err(UserError::EmailAlreadyRegistered(email));
        }

        let user_id = 1000 + self.next_id.fetch_add(1, Ordering::SeqCst) as i64;
        let user = UserProjection {
            user_id,
            email,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            phone_number: Some(request.phone_number.clone()),
            dni: Some(request.dni.clone()),
            role: request.role.clone(),
            active: true,
            address: request.address.clone(),
            profile_image_url: None,
        };
        users.insert(user_id, user.clone());
        Ok(user)
    }

    async fn apply_partial_update(&self, request: &UpdateRequest) -> Result<UserProjection, UserError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;

        let mut users = self.users.lock().unwrap();
        let email = request.email.as_deref().map(|e| e.trim().to_lowercase());
        if let Some(ref email) = email {
            let taken = users
                .values()
                .any(|u| u.email == *email && u.user_id != request.user_id);
            if taken {
                return Err(UserError::EmailAlreadyRegistered(email.clone()));
            }
        }
        let user = users
            .get_mut(&request.user_id)
            .ok_or(UserError::NotFound(request.user_id))?;

        if let Some(email) = email {
            user.email = email;
        }
        if let Some(ref first_name) = request.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(ref last_name) = request.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(ref phone) = request.phone_number {
            user.phone_number = Some(phone.clone());
        }
        if let Some(ref address) = request.address {
            user.address = address.clone();
        }
        Ok(user.clone())
    }

    async fn deactivate_user(&self, user_id: i64) -> Result<(), UserError> {
        self.deactivate_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;

        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(&user_id).ok_or(UserError::NotFound(user_id))?;
        if !user.active {
            return Err(UserError::AlreadyInactive(user_id));
        }
        user.active = false;
        Ok(())
    }
}

// ============================================================================
// Recording HubGateway
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum HubCall {
    Ack(String),
    Created { user_id: i64, zones: Vec<Value>, skills: Vec<Value> },
    Updated { user_id: i64, zones: Vec<Value>, skills: Vec<Value> },
    Rejected { email: Option<String>, reason: String },
    Deactivated(i64),
}

#[derive(Default)]
pub struct RecordingHub {
    calls: Mutex<Vec<HubCall>>,
    ack_delay_ms: AtomicU64,
}

impl RecordingHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `ack` hang for `delay` before recording
    pub fn set_ack_delay(&self, delay: Duration) {
        self.ack_delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<HubCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Everything except acks
    pub fn notifications(&self) -> Vec<HubCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, HubCall::Ack(_)))
            .collect()
    }

    fn record(&self, call: HubCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl HubGateway for RecordingHub {
    async fn ack(&self, message_id: &str) {
        let delay = self.ack_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        self.record(HubCall::Ack(message_id.to_string()));
    }

    async fn notify_created(&self, user: &UserProjection, zones: &[Value], skills: &[Value]) {
        self.record(HubCall::Created {
            user_id: user.user_id,
            zones: zones.to_vec(),
            skills: skills.to_vec(),
        });
    }

    async fn notify_updated(&self, user: &UserProjection, zones: &[Value], skills: &[Value]) {
        self.record(HubCall::Updated {
            user_id: user.user_id,
            zones: zones.to_vec(),
            skills: skills.to_vec(),
        });
    }

    async fn notify_rejected(&self, email: Option<&str>, reason: &str) {
        self.record(HubCall::Rejected {
            email: email.map(str::to_string),
            reason: reason.to_string(),
        });
    }

    async fn notify_deactivated(&self, user_id: i64) {
        self.record(HubCall::Deactivated(user_id));
    }
}

// ============================================================================
// Ledger that cannot be written
// ============================================================================

#[derive(Default)]
pub struct UnavailableLedger {
    pub insert_calls: AtomicUsize,
}

#[async_trait]
impl LedgerStore for UnavailableLedger {
    async fn find(&self, _message_id: &str) -> Result<Option<LedgerRecord>, LedgerError> {
        Ok(None)
    }

    async fn insert(&self, _record: &LedgerRecord) -> Result<(), LedgerError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        Err(LedgerError::Storage(sqlx::Error::PoolTimedOut))
    }

    async fn try_claim(&self, message_id: &str, _until: DateTime<Utc>) -> Result<bool, LedgerError> {
        Err(LedgerError::NotFound(message_id.to_string()))
    }

    async fn release(&self, message_id: &str) -> Result<(), LedgerError> {
        Err(LedgerError::NotFound(message_id.to_string()))
    }

    async fn mark_processed(&self, message_id: &str) -> Result<(), LedgerError> {
        Err(LedgerError::NotFound(message_id.to_string()))
    }
}
