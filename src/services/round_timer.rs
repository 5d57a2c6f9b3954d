//! The per-round countdown task.

use std::time::Duration;

use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::sleep,
};
use tracing::debug;

use crate::{
    services::{game_service, sse_events},
    state::SharedState,
};

/// Handle to a running countdown. Exactly one exists per session; installing
/// a new one through the shared state cancels the previous one first.
pub struct RoundTimerHandle {
    round: usize,
    cancel: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RoundTimerHandle {
    /// Index of the round this countdown belongs to.
    pub fn round(&self) -> usize {
        self.round
    }

    /// Stop the countdown. The tick task exits at its next wakeup; a tick
    /// already past the cancellation check resolves through the transition
    /// gate, where a stale reveal fails as an invalid transition.
    pub fn cancel(self) {
        let _ = self.cancel.send(());
        drop(self.task);
    }
}

/// Spawn the one-second tick loop for a round.
///
/// Every tick decrements the session countdown and notifies the
/// presentation stream; when it reaches zero the task triggers the reveal
/// and exits.
pub fn spawn(state: SharedState, round: usize, time_limit_secs: u64) -> RoundTimerHandle {
    let (cancel_tx, mut cancel_rx) = oneshot::channel();

    let task = tokio::spawn(async move {
        let mut remaining = time_limit_secs;
        loop {
            tokio::select! {
                _ = &mut cancel_rx => return,
                _ = sleep(Duration::from_secs(1)) => {}
            }

            remaining = remaining.saturating_sub(1);

            let updated = state
                .with_session_mut(|session| {
                    session.time_left_secs = remaining;
                    Ok(())
                })
                .await;
            if updated.is_err() {
                // Session was torn down under us; nothing left to count.
                return;
            }

            sse_events::broadcast_timer_tick(&state, round, remaining);

            if remaining == 0 {
                if let Err(err) = game_service::reveal_round(&state, Some(round)).await {
                    debug!(round, error = %err, "timer reveal superseded");
                }
                return;
            }
        }
    });

    RoundTimerHandle {
        round,
        cancel: cancel_tx,
        task,
    }
}
