//! Lifetime scope for a view's in-flight requests.

use std::future::Future;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("view closed before the request finished")
    }
}

impl std::error::Error for Cancelled {}

/// Cancels every request started through it once closed or dropped.
#[derive(Debug, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that can close the scope from another task.
    pub fn closer(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn close(&self) {
        self.token.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves to the future's output, or `Cancelled` if the scope closes
    /// first. A closed scope never polls `fut`.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Cancelled> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(Cancelled),
            out = fut => Ok(out),
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn open_scope_passes_output_through() {
        let scope = ViewScope::new();
        assert_eq!(scope.run(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn closed_scope_never_polls() {
        let scope = ViewScope::new();
        scope.close();
        let mut polled = false;
        let out = scope
            .run(async {
                polled = true;
            })
            .await;
        assert_eq!(out, Err(Cancelled));
        assert!(!polled);
    }

    #[tokio::test]
    async fn closing_mid_flight_cancels() {
        let scope = ViewScope::new();
        let closer = scope.closer();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            closer.cancel();
        });
        let out = scope.run(std::future::pending::<()>()).await;
        assert_eq!(out, Err(Cancelled));
    }

    #[test]
    fn drop_cancels_token() {
        let scope = ViewScope::new();
        let closer = scope.closer();
        drop(scope);
        assert!(closer.is_cancelled());
    }
}
