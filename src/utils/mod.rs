pub mod circuit_breaker;
pub mod retry;

pub use circuit_breaker::{BreakerError, BreakerSettings, CircuitBreaker, CircuitState};
pub use retry::{retry_on_transient, Backoff, IsTransient};
