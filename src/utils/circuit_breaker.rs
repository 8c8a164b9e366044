use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

// ============================================================================
// Circuit Breaker - Guards Outbound Hub Publishing
// ============================================================================
//
// Closed   -> calls pass; consecutive failures counted
// Open     -> calls rejected until `open_for` has elapsed
// HalfOpen -> trial calls pass; `close_after` successes close, any failure reopens
//
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    /// Gauge encoding: 0 closed, 1 open, 2 half-open
    pub fn gauge_value(&self) -> i64 {
        match self {
            CircuitState::Closed => 0,
            CircuitState::Open => 1,
            CircuitState::HalfOpen => 2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BreakerSettings {
    /// Consecutive failures that open the circuit
    pub open_after: u32,
    /// How long an open circuit rejects calls
    pub open_for: Duration,
    /// Half-open successes needed to close again
    pub close_after: u32,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            open_after: 5,
            open_for: Duration::from_secs(30),
            close_after: 2,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BreakerError<E> {
    #[error("circuit '{0}' is open")]
    Open(&'static str),

    #[error(transparent)]
    Inner(E),
}

struct Counters {
    state: CircuitState,
    failures: u32,
    successes: u32,
    opened_at: Option<Instant>,
}

#[derive(Clone)]
pub struct CircuitBreaker {
    name: &'static str,
    settings: BreakerSettings,
    counters: Arc<Mutex<Counters>>,
}

impl CircuitBreaker {
    pub fn new(name: &'static str, settings: BreakerSettings) -> Self {
        Self {
            name,
            settings,
            counters: Arc::new(Mutex::new(Counters {
                state: CircuitState::Closed,
                failures: 0,
                successes: 0,
                opened_at: None,
            })),
        }
    }

    pub async fn call<F, T, E>(&self, operation: F) -> Result<T, BreakerError<E>>
    where
        F: std::future::Future<Output = Result<T, E>>,
    {
        self.admit().await?;

        match operation.await {
            Ok(value) => {
                self.on_success().await;
                Ok(value)
            }
            Err(e) => {
                self.on_failure().await;
                Err(BreakerError::Inner(e))
            }
        }
    }

    async fn admit<E>(&self) -> Result<(), BreakerError<E>> {
        let mut counters = self.counters.lock().await;
        if counters.state != CircuitState::Open {
            return Ok(());
        }

        let cooled_down = counters
            .opened_at
            .map(|at| at.elapsed() >= self.settings.open_for)
            .unwrap_or(true);
        if !cooled_down {
            return Err(BreakerError::Open(self.name));
        }

        tracing::info!(breaker = self.name, "Circuit half-open, allowing a trial call");
        counters.state = CircuitState::HalfOpen;
        counters.successes = 0;
        Ok(())
    }

    async fn on_success(&self) {
        let mut counters = self.counters.lock().await;
        match counters.state {
            CircuitState::HalfOpen => {
                counters.successes += 1;
                if counters.successes >= self.settings.close_after {
                    tracing::info!(breaker = self.name, "Circuit closed");
                    counters.state = CircuitState::Closed;
                    counters.failures = 0;
                    counters.successes = 0;
                    counters.opened_at = None;
                }
            }
            CircuitState::Closed => counters.failures = 0,
            CircuitState::Open => {}
        }
    }

    async fn on_failure(&self) {
        let mut counters = self.counters.lock().await;
        counters.failures += 1;

        let reopen = match counters.state {
            CircuitState::Closed => counters.failures >= self.settings.open_after,
            CircuitState::HalfOpen => true,
            CircuitState::Open => false,
        };
        if reopen {
            tracing::warn!(
                breaker = self.name,
                failures = counters.failures,
                "⚠️ Circuit opened"
            );
            counters.state = CircuitState::Open;
            counters.successes = 0;
            counters.opened_at = Some(Instant::now());
        }
    }

    pub async fn state(&self) -> CircuitState {
        self.counters.lock().await.state
    }
}
