use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use super::errors::UserError;
use super::requests::{RegistrationRequest, UpdateRequest};
use super::service::UserService;
use super::value_objects::{Address, UserProjection};

// ============================================================================
// PostgreSQL User Service
// ============================================================================
//
// Minimal persistence for the three operations reachable from hub events.
// Credentials belong to the directory service and are not stored here.
//
// ============================================================================

#[derive(Clone)]
pub struct PostgresUserService {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    first_name: String,
    last_name: String,
    phone_number: Option<String>,
    dni: Option<String>,
    role: String,
    active: bool,
    address: Json<Vec<Address>>,
    profile_image_url: Option<String>,
}

impl From<UserRow> for UserProjection {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone_number: row.phone_number,
            dni: row.dni,
            role: row.role,
            active: row.active,
            address: row.address.0,
            profile_image_url: row.profile_image_url,
        }
    }
}

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, phone_number, dni, role, active, address, profile_image_url";

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_registration(request: &RegistrationRequest) -> Result<(), UserError> {
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(UserError::Invalid(format!("invalid email format: {}", request.email)));
    }
    if request.first_name.trim().is_empty() || request.last_name.trim().is_empty() {
        return Err(UserError::Invalid("first and last name are required".to_string()));
    }
    if request.role.trim().is_empty() {
        return Err(UserError::Invalid("role is required".to_string()));
    }
    Ok(())
}

impl PostgresUserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn email_taken(&self, email: &str, except_id: Option<i64>) -> Result<bool, UserError> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
        )
        .bind(email)
        .bind(except_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }
}

#[async_trait]
impl UserService for PostgresUserService {
    async fn create_user(&self, request: &RegistrationRequest) -> Result<UserProjection, UserError> {
        validate_registration(request)?;
        let email = normalize_email(&request.email);

        if self.email_taken(&email, None).await? {
            return Err(UserError::EmailAlreadyRegistered(email));
        }

        let query = format!(
            "INSERT INTO users (email, first_name, last_name, phone_number, dni, role, active, address)
             VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7)
             RETURNING {USER_COLUMNS}"
        );
        let result = sqlx::query_as::<_, UserRow>(&query)
            .bind(&email)
            .bind(request.first_name.trim())
            .bind(request.last_name.trim())
            .bind(&request.phone_number)
            .bind(&request.dni)
            .bind(&request.role)
            .bind(Json(&request.address))
            .fetch_one(&self.pool)
            .await;

        let row = match result {
            Ok(row) => row,
            // Lost a race with a concurrent registration of the same email
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(UserError::EmailAlreadyRegistered(email));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = row.id, email = %row.email, "Created user");
        Ok(row.into())
    }

    async fn apply_partial_update(&self, request: &UpdateRequest) -> Result<UserProjection, UserError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(request.user_id)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Err(UserError::NotFound(request.user_id));
        }

        let email = request.email.as_deref().map(normalize_email);
        if let Some(ref email) = email {
            if self.email_taken(email, Some(request.user_id)).await? {
                return Err(UserError::EmailAlreadyRegistered(email.clone()));
            }
        }

        let query = format!(
            "UPDATE users SET
                 email = COALESCE($2, email),
                 first_name = COALESCE($3, first_name),
                 last_name = COALESCE($4, last_name),
                 phone_number = COALESCE($5, phone_number),
                 role = COALESCE($6, role),
                 address = COALESCE($7, address),
                 profile_image_url = COALESCE($8, profile_image_url),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(request.user_id)
            .bind(email)
            .bind(&request.first_name)
            .bind(&request.last_name)
            .bind(&request.phone_number)
            .bind(&request.role)
            .bind(request.address.as_ref().map(Json))
            .bind(&request.profile_image_url)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(UserError::NotFound(request.user_id))?;

        tracing::info!(user_id = row.id, "Updated user");
        Ok(row.into())
    }

    async fn deactivate_user(&self, user_id: i64) -> Result<(), UserError> {
        // Conditional update so two racing deactivations cannot both succeed
        let deactivated = sqlx::query(
            "UPDATE users SET active = FALSE, updated_at = NOW() WHERE id = $1 AND active",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if deactivated == 1 {
            tracing::info!(user_id = user_id, "Deactivated user");
            return Ok(());
        }

        let active: Option<bool> = sqlx::query_scalar("SELECT active FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        match active {
            None => Err(UserError::NotFound(user_id)),
            Some(_) => {
                tracing::error!(user_id = user_id, "Tried to deactivate an inactive user");
                Err(UserError::AlreadyInactive(user_id))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(email: &str, first_name: &str) -> RegistrationRequest {
        RegistrationRequest {
            email: email.to_string(),
            password: "pw".to_string(),
            first_name: first_name.to_string(),
            last_name: "Doe".to_string(),
            dni: "12345678".to_string(),
            phone_number: "555".to_string(),
            role: "CLIENTE".to_string(),
            address: vec![],
            zones: vec![],
            skills: vec![],
        }
    }

    #[test]
    fn test_normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  John.Doe@Example.COM "), "john.doe@example.com");
    }

    #[test]
    fn test_validate_registration_rejects_bad_email() {
        let err = validate_registration(&request("not-an-email", "John")).unwrap_err();
        assert!(matches!(err, UserError::Invalid(msg) if msg.contains("not-an-email")));
    }

    #[test]
    fn test_validate_registration_rejects_blank_name() {
        assert!(validate_registration(&request("a@b.com", "  ")).is_err());
        assert!(validate_registration(&request("a@b.com", "John")).is_ok());
    }
}
