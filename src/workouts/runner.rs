//! Async driver for a workout session.
//!
//! The runner owns the session and its rest timer. Commands arrive over an
//! mpsc channel, state changes are published on a broadcast channel. The
//! timer only runs while the session is resting and is released on every
//! exit path.

use chrono::Utc;
use tokio::sync::{broadcast, mpsc};

use super::backend::WorkoutBackend;
use super::session::WorkoutSession;
use super::timer::RestTimer;
use super::types::{RestTick, SessionError, SetOutcome};
use crate::api::WorkoutLog;

const EVENT_CAPACITY: usize = 64;

/// User input for a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Mark one set of the current exercise as done
    CompleteSet,
    /// End the rest countdown early
    SkipRest,
    /// Jump to the exercise at this position
    Select(usize),
    /// Submit the workout log; rejected until every set is done
    Finish,
    /// Leave without saving, at any point
    Abandon,
}

/// Published session state changes.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A set was recorded
    SetCompleted {
        exercise_index: usize,
        outcome: SetOutcome,
    },
    /// Rest countdown ticked
    RestTick { remaining: u32 },
    /// Rest countdown reached zero
    RestFinished,
    /// Rest countdown ended early
    RestSkipped,
    /// Current exercise changed by selection
    ExerciseSelected { index: usize },
    /// A command was not valid in the current state
    CommandRejected { reason: String },
    /// The backend stored the workout
    Submitted { log: WorkoutLog },
    /// Submission failed; the session can be finished again
    SubmitFailed { message: String },
    /// Session left without saving
    Abandoned,
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Workout stored
    Submitted(WorkoutLog),
    /// User left without saving
    Abandoned(WorkoutSession),
    /// Command channel closed
    Disconnected(WorkoutSession),
}

/// Drives a [`WorkoutSession`] from commands and the rest timer.
pub struct SessionRunner<'a, B: WorkoutBackend> {
    session: WorkoutSession,
    backend: &'a B,
    timer: RestTimer,
    event_tx: broadcast::Sender<SessionEvent>,
}

impl<'a, B: WorkoutBackend> SessionRunner<'a, B> {
    /// Create a runner with a one-second rest timer.
    pub fn new(
        session: WorkoutSession,
        backend: &'a B,
    ) -> (Self, broadcast::Receiver<SessionEvent>) {
        Self::with_timer(session, backend, RestTimer::new())
    }

    /// Create a runner with a custom rest timer.
    pub fn with_timer(
        session: WorkoutSession,
        backend: &'a B,
        timer: RestTimer,
    ) -> (Self, broadcast::Receiver<SessionEvent>) {
        let (tx, rx) = broadcast::channel(EVENT_CAPACITY);
        (
            Self {
                session,
                backend,
                timer,
                event_tx: tx,
            },
            rx,
        )
    }

    /// Subscribe to session events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.event_tx.subscribe()
    }

    /// The driven session.
    pub fn session(&self) -> &WorkoutSession {
        &self.session
    }

    /// Process commands and timer ticks until the session is submitted,
    /// abandoned, or the command channel closes.
    pub async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) -> RunOutcome {
        loop {
            tokio::select! {
                _ = self.timer.tick(), if self.timer.is_running() => self.on_tick(),
                command = commands.recv() => {
                    let Some(command) = command else {
                        tracing::debug!("Command channel closed, stopping session runner");
                        self.timer.clear();
                        return RunOutcome::Disconnected(self.session);
                    };
                    if let Some(outcome) = self.handle(command).await {
                        return outcome;
                    }
                }
            }
        }
    }

    async fn handle(&mut self, command: SessionCommand) -> Option<RunOutcome> {
        match command {
            SessionCommand::CompleteSet => {
                let exercise_index = self.session.current_index();
                match self.session.complete_set() {
                    Ok(outcome) => {
                        if matches!(outcome, SetOutcome::Resting { .. }) {
                            self.timer.start();
                        }
                        self.emit(SessionEvent::SetCompleted {
                            exercise_index,
                            outcome,
                        });
                    }
                    Err(e) => self.reject(e.to_string()),
                }
            }
            SessionCommand::SkipRest => {
                if self.session.skip_rest() {
                    self.timer.clear();
                    self.emit(SessionEvent::RestSkipped);
                } else {
                    self.reject("No rest countdown running".to_string());
                }
            }
            SessionCommand::Select(index) => match self.session.select_exercise(index) {
                Ok(()) => self.emit(SessionEvent::ExerciseSelected { index }),
                Err(e) => self.reject(e.to_string()),
            },
            SessionCommand::Finish => {
                match self.session.submit(self.backend, Utc::now()).await {
                    Ok(log) => {
                        self.timer.clear();
                        self.emit(SessionEvent::Submitted { log: log.clone() });
                        return Some(RunOutcome::Submitted(log));
                    }
                    Err(e @ SessionError::NotComplete { .. }) => self.reject(e.to_string()),
                    Err(e) => self.emit(SessionEvent::SubmitFailed {
                        message: e.to_string(),
                    }),
                }
            }
            SessionCommand::Abandon => {
                tracing::info!("Workout abandoned");
                self.timer.clear();
                self.emit(SessionEvent::Abandoned);
                return Some(RunOutcome::Abandoned(self.session.clone()));
            }
        }
        None
    }

    fn on_tick(&mut self) {
        match self.session.tick() {
            RestTick::Counting { remaining } => self.emit(SessionEvent::RestTick { remaining }),
            RestTick::Finished => {
                self.timer.clear();
                self.emit(SessionEvent::RestFinished);
            }
            RestTick::Idle => {
                self.timer.clear();
            }
        }
    }

    fn reject(&self, reason: String) {
        tracing::debug!("Command rejected: {}", reason);
        self.emit(SessionEvent::CommandRejected { reason });
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.event_tx.send(event);
    }
}
