//! Services sit between handlers and `halo_core`, one per route group.
//!
//! Every call that touches persistence runs under [`with_deadline`].

pub mod image;
pub mod medical;
pub mod user;

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{AppError, AppResult};

/// Run `fut` under `limit`. On expiry the future is dropped, which cancels
/// any in-flight query, and the caller gets [`AppError::Timeout`].
pub async fn with_deadline<T, E, F>(limit: Duration, fut: F) -> AppResult<T>
where
    F: Future<Output = Result<T, E>>,
    AppError: From<E>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(AppError::from),
        Err(_) => {
            warn!(limit_ms = limit.as_millis() as u64, "service call exceeded deadline");
            Err(AppError::Timeout)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn completes_within_deadline() {
        let out = with_deadline(Duration::from_secs(1), async { Ok::<_, AppError>(7) }).await;
        assert_eq!(out.unwrap(), 7);
    }

    #[tokio::test]
    async fn slow_call_times_out() {
        let out = with_deadline(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, AppError>(())
        })
        .await;
        assert!(matches!(out, Err(AppError::Timeout)));
    }

    #[tokio::test]
    async fn inner_errors_are_converted() {
        let out = with_deadline(Duration::from_secs(1), async {
            Err::<(), _>(halo_core::users::UserError::DuplicateNip)
        })
        .await;
        assert!(matches!(out, Err(AppError::Conflict(_))));
    }
}
