use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Observe-only view of an executor run's shutdown signal.
///
/// The signal starts armed and trips exactly once, when the owning executor
/// is stopped. Task bodies can poll it or wait on it but never trip it.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    token: CancellationToken,
}

impl ShutdownSignal {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Non-blocking check, meant for loop boundaries.
    pub fn is_tripped(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal trips.
    pub async fn tripped(&self) {
        self.token.cancelled().await
    }

    /// Sleeps for `period` unless the signal trips first.
    ///
    /// Returns `true` if the full period elapsed and `false` if the signal tripped.
    pub async fn sleep(&self, period: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => false,
            _ = tokio::time::sleep(period) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    #[tokio::test]
    async fn sleep_is_cut_short_by_tripping() {
        tokio::time::pause();
        let token = CancellationToken::new();
        let signal = ShutdownSignal::new(token.clone());
        assert!(!signal.is_tripped());
        assert!(signal.sleep(Duration::from_millis(10)).await);

        let trip = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(3)).await;
            token.cancel();
        });
        let started = Instant::now();
        assert!(!signal.sleep(Duration::from_secs(60)).await);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert!(signal.is_tripped());
        trip.await.unwrap();

        // Once tripped it stays tripped.
        assert!(!signal.sleep(Duration::from_millis(10)).await);
        signal.tripped().await;
    }
}
