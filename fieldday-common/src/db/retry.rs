//! Write-contention retry
//!
//! Multiple request workers write concurrently to one embedded store; SQLite
//! admits a single writer at a time and surfaces the loser as a "database is
//! locked" error once its busy timeout lapses. This layer retries such
//! transient failures with exponential backoff plus jitter. Any other error
//! class propagates immediately.

use crate::{Error, Result};
use rand::Rng;
use std::time::Duration;

/// Maximum attempts before giving up with [`Error::Contention`].
pub const MAX_ATTEMPTS: u32 = 5;

const BASE_DELAY_MS: u64 = 100;
const MAX_DELAY_MS: u64 = 1000;
const JITTER_MS: u64 = 100;

/// Retry a write operation while the store reports it is locked.
///
/// The operation is the whole transactional unit: once SQLite aborts a
/// transaction with a busy error there is nothing statement-level left to
/// resume, so the closed-over unit re-runs from the top. Delay before attempt
/// `n` is `min(base * 2^n + jitter, max_delay)`.
pub async fn retry_on_busy<F, Fut, T>(operation_name: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    for attempt in 0..MAX_ATTEMPTS {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                if !is_busy_error(&err) {
                    // Non-lock error, fail immediately
                    return Err(err);
                }

                if attempt + 1 >= MAX_ATTEMPTS {
                    tracing::error!(
                        operation = operation_name,
                        attempts = MAX_ATTEMPTS,
                        "Database still locked after final retry"
                    );
                    return Err(Error::Contention(format!(
                        "{}: database locked after {} attempts",
                        operation_name, MAX_ATTEMPTS
                    )));
                }

                let jitter = rand::thread_rng().gen_range(0..JITTER_MS);
                let delay_ms = (BASE_DELAY_MS << attempt).saturating_add(jitter).min(MAX_DELAY_MS);

                tracing::warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    delay_ms,
                    "Database locked, will retry after backoff"
                );

                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }

    unreachable!("retry loop always returns within MAX_ATTEMPTS iterations")
}

/// Classify an error as a transient SQLite lock condition.
fn is_busy_error(err: &Error) -> bool {
    match err {
        Error::Database(db_err) => {
            let msg = db_err.to_string();
            msg.contains("database is locked") || msg.contains("database table is locked")
        }
        _ => false,
    }
}
