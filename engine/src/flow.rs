//! Verification flow controller.
//!
//! Owns the gate screen's `VerificationState` and drives one provider call at
//! a time. The call runs on a spawned task and reports back through a channel
//! that the frame loop drains with [`VerificationFlow::poll`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use dream_providers::{HostEnvironment, VerificationProvider};
use dream_types::{
    ActionId, FlowPhase, VerificationError, VerificationState, VerifyPayload, VerifyRequest,
    feedback,
};

/// Progress reported by the spawned verification task.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FlowEvent {
    /// Provider returned success; the confirmation delay has started.
    Confirming,
    Finished(Result<(), VerificationError>),
}

#[derive(Debug)]
pub struct VerificationFlow {
    state: VerificationState,
    phase: FlowPhase,
    action: ActionId,
    confirm_delay: Duration,
    pending: Option<mpsc::UnboundedReceiver<FlowEvent>>,
}

impl VerificationFlow {
    #[must_use]
    pub fn new(action: ActionId, confirm_delay: Duration) -> Self {
        Self {
            state: VerificationState::default(),
            phase: FlowPhase::Idle,
            action,
            confirm_delay,
            pending: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &VerificationState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.state.verified
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    #[must_use]
    pub fn feedback(&self) -> &str {
        &self.state.feedback
    }

    #[must_use]
    pub fn action(&self) -> &ActionId {
        &self.action
    }

    /// Start a verification attempt.
    ///
    /// Returns `false` without touching state while a request is in flight or
    /// after success. Must be called from within a tokio runtime.
    pub fn begin(&mut self, host: &HostEnvironment) -> bool {
        if !self.phase.can_trigger() {
            tracing::debug!(phase = ?self.phase, "Ignoring verification trigger");
            return false;
        }

        self.phase = FlowPhase::Requesting;
        self.state.loading = true;
        self.state.feedback = feedback::PLEASE_VERIFY.to_string();

        let Some(provider) = host.provider() else {
            self.apply_outcome(Err(VerificationError::ProviderUnavailable));
            return true;
        };

        let request = VerifyRequest::orb(self.action.clone());
        tracing::info!(
            provider = provider.name(),
            action = %request.action,
            "Requesting verification"
        );

        let (tx, rx) = mpsc::unbounded_channel();
        self.pending = Some(rx);
        let delay = self.confirm_delay;
        tokio::spawn(run_verification(provider, request, delay, tx));
        true
    }

    /// Apply any events the verification task has sent. Never blocks.
    pub fn poll(&mut self) {
        loop {
            let Some(rx) = self.pending.as_mut() else {
                return;
            };
            let event = match rx.try_recv() {
                Ok(event) => event,
                Err(mpsc::error::TryRecvError::Empty) => return,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    tracing::warn!("Verification task disconnected");
                    FlowEvent::Finished(Err(disconnected()))
                }
            };
            self.handle(event);
        }
    }

    /// Wait until the in-flight attempt, if any, has finished.
    pub async fn settle(&mut self) {
        while let Some(rx) = self.pending.as_mut() {
            let event = rx
                .recv()
                .await
                .unwrap_or_else(|| FlowEvent::Finished(Err(disconnected())));
            self.handle(event);
        }
    }

    /// Move to a terminal phase. This is the only place `verified` is set.
    pub fn apply_outcome(&mut self, outcome: Result<(), VerificationError>) {
        self.pending = None;
        self.state.loading = false;
        match outcome {
            Ok(()) => {
                tracing::info!("Verification succeeded");
                self.phase = FlowPhase::Succeeded;
                self.state.verified = true;
            }
            Err(err) => {
                tracing::warn!("Verification failed: {err}");
                self.phase = match err {
                    VerificationError::Cancelled => FlowPhase::Cancelled,
                    VerificationError::ProviderUnavailable | VerificationError::Failed(_) => {
                        FlowPhase::Failed
                    }
                };
                self.state.feedback = err.feedback();
            }
        }
    }

    fn handle(&mut self, event: FlowEvent) {
        match event {
            FlowEvent::Confirming => {
                self.phase = FlowPhase::Confirming;
                self.state.feedback = feedback::CONFIRMING.to_string();
            }
            FlowEvent::Finished(outcome) => self.apply_outcome(outcome),
        }
    }
}

fn disconnected() -> VerificationError {
    VerificationError::Failed("verification ended unexpectedly".to_string())
}

async fn run_verification(
    provider: Arc<dyn VerificationProvider>,
    request: VerifyRequest,
    confirm_delay: Duration,
    tx: mpsc::UnboundedSender<FlowEvent>,
) {
    let outcome = match provider.verify(request).await {
        Ok(VerifyPayload::Success {
            verification_level, ..
        }) => {
            tracing::debug!(level = verification_level.as_str(), "Proof received");
            // Receiver gone means the flow was dropped; nothing left to report to.
            if tx.send(FlowEvent::Confirming).is_err() {
                return;
            }
            tokio::time::sleep(confirm_delay).await;
            Ok(())
        }
        Ok(VerifyPayload::Error { error_code }) => {
            tracing::debug!(?error_code, "Provider returned a non-success status");
            Err(VerificationError::Cancelled)
        }
        Ok(VerifyPayload::Other) => {
            tracing::debug!("Provider returned an unrecognized status");
            Err(VerificationError::Cancelled)
        }
        Err(err) => Err(VerificationError::Failed(err.to_string())),
    };
    let _ = tx.send(FlowEvent::Finished(outcome));
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use futures_util::future::{self, BoxFuture};

    use dream_providers::{
        HostEnvironment, ProviderError, Scripted, ScriptedProvider, VerificationProvider,
    };
    use dream_types::{ActionId, FlowPhase, VerifyPayload, VerifyRequest, feedback};

    use super::VerificationFlow;

    const DELAY: Duration = Duration::from_millis(30);

    fn flow() -> VerificationFlow {
        VerificationFlow::new(ActionId::default(), DELAY)
    }

    /// Provider whose call panics, taking the spawned task down with it.
    #[derive(Debug)]
    struct PanickingProvider;

    impl VerificationProvider for PanickingProvider {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn verify(
            &self,
            _request: VerifyRequest,
        ) -> BoxFuture<'static, Result<VerifyPayload, ProviderError>> {
            Box::pin(future::lazy(|_| -> Result<VerifyPayload, ProviderError> {
                panic!("provider crashed")
            }))
        }
    }

    fn host_with(provider: ScriptedProvider) -> HostEnvironment {
        let host = HostEnvironment::new();
        host.install(Arc::new(provider));
        host
    }

    #[test]
    fn starts_idle_with_welcome() {
        let flow = flow();
        assert_eq!(flow.phase(), FlowPhase::Idle);
        assert!(!flow.is_verified());
        assert!(!flow.is_loading());
        assert_eq!(flow.feedback(), feedback::WELCOME);
    }

    #[tokio::test]
    async fn absent_provider_fails_immediately() {
        let mut flow = flow();
        let host = HostEnvironment::new();

        assert!(flow.begin(&host));
        assert_eq!(flow.phase(), FlowPhase::Failed);
        assert!(!flow.is_loading());
        assert!(!flow.is_verified());
        assert!(flow.feedback().contains("unavailable"));
        assert!(flow.feedback().starts_with("Error: "));
    }

    #[tokio::test]
    async fn success_verifies_after_delay() {
        let mut flow = flow();
        let host = host_with(ScriptedProvider::always(Scripted::success()));

        let started = Instant::now();
        assert!(flow.begin(&host));
        assert!(flow.is_loading());
        assert_eq!(flow.feedback(), feedback::PLEASE_VERIFY);

        flow.settle().await;
        assert!(started.elapsed() >= DELAY);
        assert_eq!(flow.phase(), FlowPhase::Succeeded);
        assert!(flow.is_verified());
        assert!(!flow.is_loading());
    }

    #[tokio::test]
    async fn confirming_shows_proof_message_while_loading() {
        let mut flow = VerificationFlow::new(ActionId::default(), Duration::from_secs(5));
        let host = host_with(ScriptedProvider::always(Scripted::success()));
        flow.begin(&host);

        // Wait for the provider answer, not the confirmation delay.
        for _ in 0..100 {
            flow.poll();
            if flow.phase() == FlowPhase::Confirming {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(flow.phase(), FlowPhase::Confirming);
        assert_eq!(flow.feedback(), feedback::CONFIRMING);
        assert!(flow.is_loading());
        assert!(!flow.is_verified());
    }

    #[tokio::test]
    async fn non_success_status_is_a_cancellation() {
        let mut flow = flow();
        let host = host_with(ScriptedProvider::always(Scripted::cancelled()));

        flow.begin(&host);
        flow.settle().await;

        assert_eq!(flow.phase(), FlowPhase::Cancelled);
        assert!(!flow.is_verified());
        assert!(!flow.is_loading());
        assert_eq!(flow.feedback(), "Error: Verification was cancelled.");
    }

    #[tokio::test]
    async fn provider_error_is_a_failure_with_its_message() {
        let mut flow = flow();
        let host = host_with(ScriptedProvider::always(Scripted::fail("bridge offline")));

        flow.begin(&host);
        flow.settle().await;

        assert_eq!(flow.phase(), FlowPhase::Failed);
        assert_eq!(flow.feedback(), "Error: bridge offline");
        assert!(!flow.is_loading());
    }

    #[tokio::test]
    async fn retrigger_after_failure_is_allowed() {
        let mut flow = flow();
        let provider = Arc::new(ScriptedProvider::new([
            Scripted::cancelled(),
            Scripted::success(),
        ]));
        let host = HostEnvironment::new();
        host.install(provider.clone());

        flow.begin(&host);
        flow.settle().await;
        assert_eq!(flow.phase(), FlowPhase::Cancelled);

        assert!(flow.begin(&host));
        flow.settle().await;
        assert!(flow.is_verified());

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert!(
            requests
                .iter()
                .all(|r| r.action.as_str() == "enter-dream"
                    && r.verification_level.as_str() == "orb")
        );
    }

    #[tokio::test]
    async fn trigger_while_loading_is_ignored() {
        let mut flow = flow();
        let provider = Arc::new(
            ScriptedProvider::always(Scripted::success()).with_latency(Duration::from_millis(50)),
        );
        let host = HostEnvironment::new();
        host.install(provider.clone());

        assert!(flow.begin(&host));
        assert!(!flow.begin(&host));
        flow.poll();
        assert!(flow.is_loading());

        flow.settle().await;
        assert_eq!(provider.requests().len(), 1);
    }

    #[tokio::test]
    async fn no_reentry_after_success() {
        let mut flow = flow();
        let host = host_with(ScriptedProvider::always(Scripted::success()));

        flow.begin(&host);
        flow.settle().await;
        assert!(flow.is_verified());

        assert!(!flow.begin(&host));
        assert_eq!(flow.phase(), FlowPhase::Succeeded);
        assert!(!flow.is_loading());
    }

    #[tokio::test]
    async fn settle_without_request_returns() {
        let mut flow = flow();
        flow.settle().await;
        assert_eq!(flow.phase(), FlowPhase::Idle);
    }

    #[tokio::test]
    async fn unrecognized_status_is_a_cancellation() {
        let mut flow = flow();
        let host = host_with(ScriptedProvider::always(Scripted::Payload(
            VerifyPayload::Other,
        )));

        flow.begin(&host);
        flow.settle().await;

        assert_eq!(flow.phase(), FlowPhase::Cancelled);
        assert!(!flow.is_loading());
        assert_eq!(flow.feedback(), "Error: Verification was cancelled.");
    }

    #[tokio::test]
    async fn vanished_task_fails_on_poll() {
        let mut flow = flow();
        let host = HostEnvironment::new();
        host.install(Arc::new(PanickingProvider));

        assert!(flow.begin(&host));
        for _ in 0..100 {
            flow.poll();
            if !flow.is_loading() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(flow.phase(), FlowPhase::Failed);
        assert!(!flow.is_loading());
        assert!(!flow.is_verified());
        assert!(flow.feedback().contains("ended unexpectedly"));
    }

    #[tokio::test]
    async fn vanished_task_fails_on_settle() {
        let mut flow = flow();
        let host = HostEnvironment::new();
        host.install(Arc::new(PanickingProvider));

        flow.begin(&host);
        flow.settle().await;

        assert_eq!(flow.phase(), FlowPhase::Failed);
        assert!(!flow.is_loading());
        assert!(flow.feedback().starts_with("Error: "));
    }
}
