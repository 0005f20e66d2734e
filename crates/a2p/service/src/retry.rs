use std::future::Future;

use tracing::warn;

use crate::error::ServiceResult;

/// Re-run `op` while it fails with a version conflict.
///
/// `op` must perform the whole load/transform/save cycle so each attempt
/// starts from a fresh snapshot. Any other error, or the last conflict, is
/// returned as is.
pub async fn retry_on_conflict<T, F, Fut>(max_attempts: u32, mut op: F) -> ServiceResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ServiceResult<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Err(err) if err.is_conflict() && attempt < max_attempts => {
                warn!(attempt, max_attempts, error = %err, "retrying after version conflict");
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use a2p_storage::StorageError;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn conflict() -> ServiceError {
        StorageError::Conflict {
            expected: 1,
            found: 2,
        }
        .into()
    }

    #[tokio::test]
    async fn succeeds_after_conflicts() {
        let calls = &AtomicU32::new(0);
        let result = retry_on_conflict(3, move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(conflict())
            } else {
                Ok("saved")
            }
        })
        .await
        .unwrap();
        assert_eq!(result, "saved");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = &AtomicU32::new(0);
        let err = retry_on_conflict(2, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(conflict())
        })
        .await
        .unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn other_errors_are_not_retried() {
        let calls = &AtomicU32::new(0);
        let err = retry_on_conflict(5, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(ServiceError::Config("bad".into()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Config(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
