//! Shared application state: the hosted game session, its state machine,
//! connected peers and the presentation event hub.

pub mod game;
pub mod peers;
pub mod quiz;
mod sse;
pub mod state_machine;
pub mod transitions;

use std::{sync::Arc, time::Duration};

use tokio::sync::{Mutex, RwLock};
use tokio::time::timeout;
use tracing::warn;

use crate::{
    config::AppConfig,
    dao::quiz_store::QuizStore,
    error::ServiceError,
    services::round_timer::RoundTimerHandle,
    state::{game::GameSession, state_machine::GamePhase},
};

pub use self::sse::SseHub;
pub use self::state_machine::{AbortError, ApplyError, Plan, PlanError, PlanId, Snapshot};
use self::state_machine::{GameEvent, GameStateMachine};

/// Cheaply cloneable handle to the application state.
pub type SharedState = Arc<AppState>;
/// Upper bound on the work tied to a single state transition.
pub const DEFAULT_TRANSITION_TIMEOUT: Duration = Duration::from_secs(5);
/// Capacity of the presentation event broadcast channel.
const SSE_CAPACITY: usize = 32;

/// Central application state storing the live game and peer connections.
pub struct AppState {
    config: AppConfig,
    quiz_store: RwLock<Option<Arc<dyn QuizStore>>>,
    sse: SseHub,
    peers: peers::PeerRegistry,
    game: RwLock<GameStateMachine>,
    session: RwLock<Option<GameSession>>,
    round_timer: Mutex<Option<RoundTimerHandle>>,
    transition_gate: Mutex<()>,
    transition_timeout: Option<Duration>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a quiz store is installed.
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(Self {
            config,
            quiz_store: RwLock::new(None),
            sse: SseHub::new(SSE_CAPACITY),
            peers: peers::PeerRegistry::new(),
            game: RwLock::new(GameStateMachine::new()),
            session: RwLock::new(None),
            round_timer: Mutex::new(None),
            transition_gate: Mutex::new(()),
            transition_timeout: Some(DEFAULT_TRANSITION_TIMEOUT),
        })
    }

    /// Immutable game tuning configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current quiz store, if one is installed.
    pub async fn quiz_store(&self) -> Option<Arc<dyn QuizStore>> {
        let guard = self.quiz_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the quiz store or fail with a degraded-mode error.
    pub async fn require_quiz_store(&self) -> Result<Arc<dyn QuizStore>, ServiceError> {
        self.quiz_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a quiz store implementation and leave degraded mode.
    pub async fn install_quiz_store(&self, store: Arc<dyn QuizStore>) {
        let mut guard = self.quiz_store.write().await;
        *guard = Some(store);
    }

    /// Whether the application runs without a quiz store.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.quiz_store.read().await;
        guard.is_none()
    }

    /// Broadcast hub used for the presentation SSE stream.
    pub fn events(&self) -> &SseHub {
        &self.sse
    }

    /// Registry of connected player channels.
    pub fn peers(&self) -> &peers::PeerRegistry {
        &self.peers
    }

    /// Snapshot the current phase of the shared game state machine.
    pub async fn phase(&self) -> GamePhase {
        self.game.read().await.phase()
    }

    /// Currently hosted game session data.
    pub fn session(&self) -> &RwLock<Option<GameSession>> {
        &self.session
    }

    /// Run a closure against the active session under the write lock.
    ///
    /// Fails with `InvalidState` when no game is hosted.
    pub async fn with_session_mut<F, T>(&self, work: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut GameSession) -> Result<T, ServiceError>,
    {
        let mut guard = self.session.write().await;
        let session = guard
            .as_mut()
            .ok_or_else(|| ServiceError::InvalidState("no game is currently hosted".into()))?;
        work(session)
    }

    /// Run a closure against a read-only view of the session slot.
    pub async fn read_session<F, T>(&self, read: F) -> T
    where
        F: FnOnce(Option<&GameSession>) -> T,
    {
        let guard = self.session.read().await;
        read(guard.as_ref())
    }

    /// Install a round timer, cancelling any previously active one.
    ///
    /// At most one countdown exists per session; every transition routes
    /// through here (or through [`Self::cancel_round_timer`]) first.
    pub async fn install_round_timer(&self, handle: RoundTimerHandle) {
        let mut slot = self.round_timer.lock().await;
        if let Some(previous) = slot.replace(handle) {
            previous.cancel();
        }
    }

    /// Cancel the active round timer, if any.
    pub async fn cancel_round_timer(&self) {
        let mut slot = self.round_timer.lock().await;
        if let Some(previous) = slot.take() {
            previous.cancel();
        }
    }

    /// Plan a transition to the shared game state machine, returning the plan.
    async fn plan_transition(&self, event: GameEvent) -> Result<Plan, PlanError> {
        let mut sm = self.game.write().await;
        sm.plan(event)
    }

    /// Apply the planned transition to the shared game state machine, returning the next phase.
    async fn apply_planned_transition(&self, plan_id: PlanId) -> Result<GamePhase, ApplyError> {
        let mut sm = self.game.write().await;
        sm.apply(plan_id)
    }

    /// Abort a planned transition of the shared game state machine.
    async fn abort_transition(&self, plan_id: PlanId) -> Result<(), AbortError> {
        let mut sm = self.game.write().await;
        sm.abort(plan_id)
    }

    /// Snapshot the full state machine state, including pending plans.
    pub async fn snapshot(&self) -> Snapshot {
        let sm = self.game.read().await;
        sm.snapshot()
    }

    /// Execute `work` inside a planned state transition.
    ///
    /// The transition gate serialises transitions so the vote snapshot taken
    /// while grading can never interleave with another reveal or round start.
    /// On success the transition is applied and the new phase returned; on
    /// failure or timeout the plan is aborted and the phase is unchanged.
    pub async fn run_transition<F, Fut, T>(
        &self,
        event: GameEvent,
        work: F,
    ) -> Result<(T, GamePhase), ServiceError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T, ServiceError>>,
    {
        let gate = self.transition_gate.lock().await;
        let Plan { id: plan_id, .. } = self.plan_transition(event).await?;

        let work_future = work();
        let outcome = if let Some(limit) = self.transition_timeout {
            match timeout(limit, work_future).await {
                Ok(result) => result,
                Err(_) => {
                    if let Err(abort_err) = self.abort_transition(plan_id).await {
                        warn!(
                            event = ?event,
                            plan_id = %plan_id,
                            error = ?abort_err,
                            "failed to abort transition after timeout"
                        );
                    }
                    drop(gate);
                    return Err(ServiceError::Timeout);
                }
            }
        } else {
            work_future.await
        };

        match outcome {
            Ok(value) => {
                let next = self.apply_planned_transition(plan_id).await?;
                drop(gate);
                Ok((value, next))
            }
            Err(err) => {
                if let Err(abort_err) = self.abort_transition(plan_id).await {
                    warn!(
                        event = ?event,
                        plan_id = %plan_id,
                        error = ?abort_err,
                        "failed to abort transition after work error"
                    );
                }
                drop(gate);
                Err(err)
            }
        }
    }
}
