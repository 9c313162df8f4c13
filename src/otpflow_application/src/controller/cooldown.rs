use std::{sync::Arc, time::Duration};

use otpflow_core::SessionId;
use tokio::{
    sync::RwLock,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

use crate::controller::verification_flow::FlowState;

/// Background countdown of a session's resend cooldown.
///
/// Decrements once per `period` until it reaches zero. The task stops early if the session it
/// was started for has been reset, and is aborted when the ticker is dropped.
pub(crate) struct CooldownTicker {
    handle: JoinHandle<()>,
}

impl CooldownTicker {
    pub(crate) fn spawn(
        shared: Arc<RwLock<FlowState>>,
        session_id: SessionId,
        period: Duration,
    ) -> Self {
        // interval_at panics on a zero period
        let period = period.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let mut state = shared.write().await;
                if state.session.id() != session_id {
                    tracing::debug!(%session_id, "Cooldown ticker outlived its session");
                    break;
                }

                let remaining = state.session.tick_cooldown();
                tracing::trace!(%session_id, remaining, "Resend cooldown tick");
                if remaining == 0 {
                    break;
                }
            }
        });

        Self { handle }
    }
}

impl Drop for CooldownTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
