// ============================================================================
// User Domain - Canonical Requests and the Domain Service Seam
// ============================================================================

pub mod errors;
pub mod postgres;
pub mod requests;
pub mod service;
pub mod value_objects;

pub use errors::*;
pub use postgres::PostgresUserService;
pub use requests::*;
pub use service::UserService;
pub use value_objects::*;
