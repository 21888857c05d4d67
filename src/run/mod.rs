//! Replay-driven interactive execution.
//!
//! The service keeps no session state, so interactivity is reconstructed by
//! resending the complete source together with every input gathered so far.
//! Each answered input triggers a full re-run that deterministically replays
//! the earlier rounds and stops at the next unanswered input, or finishes.
//!
//! [`RunSession`] is the pure state machine; [`drive`] loops it against an
//! [`ExecutionBackend`] (remote service or in-process engine) and an
//! [`InputSource`] (terminal prompt or preset answers).

use std::future::Future;

use anyhow::{Context, Result};

use crate::protocol::{ExecutionRequest, ExecutionResponse, InputMap, RunError};

/// Anything that can execute one replay round.
pub trait ExecutionBackend {
    fn execute(
        &self,
        request: &ExecutionRequest,
    ) -> impl Future<Output = Result<ExecutionResponse, RunError>> + Send;
}

/// Supplies values for input requests as they arrive. `Ok(None)` cancels the
/// run.
pub trait InputSource {
    fn request(&mut self, variable: &str) -> Result<Option<String>>;
}

/// Where a run currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Created, nothing sent yet.
    Idle,
    /// A request is in flight.
    AwaitingResponse,
    /// The service asked for a value and the session is waiting for it.
    AwaitingInput,
    /// Finished, failed, or cancelled. Terminal.
    Done,
}

/// What [`RunSession::absorb`] decided about one response.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The run finished with this output.
    Output(String),
    /// The run failed. Terminal; nothing is retried.
    Failed(RunError),
    /// A value for this variable is needed before replay can continue.
    NeedInput(String),
    /// The response arrived in a phase that was not waiting for one and was
    /// discarded without touching the session.
    Ignored,
}

/// One interactive run of one program.
///
/// The accumulated input map only ever grows, and requests always carry the
/// complete map, so any two requests of a session are ordered by prefix.
pub struct RunSession {
    source: String,
    inputs: InputMap,
    phase: RunPhase,
    pending: Option<String>,
}

impl RunSession {
    pub fn new(source: impl Into<String>) -> Self {
        RunSession {
            source: source.into(),
            inputs: InputMap::new(),
            phase: RunPhase::Idle,
            pending: None,
        }
    }

    #[allow(dead_code)]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    #[allow(dead_code)]
    pub fn inputs(&self) -> &InputMap {
        &self.inputs
    }

    /// First request of the run, with an empty input map. `None` once the
    /// session has left [`RunPhase::Idle`].
    pub fn begin(&mut self) -> Option<ExecutionRequest> {
        if self.phase != RunPhase::Idle {
            return None;
        }
        self.phase = RunPhase::AwaitingResponse;
        Some(self.request())
    }

    /// Feed one response (or transport failure) into the session.
    ///
    /// Responses arriving in any phase but [`RunPhase::AwaitingResponse`] are
    /// stale and reported as [`Step::Ignored`]. A request for a variable the
    /// session already answered is detected here, before anyone is prompted,
    /// and fails the run as a protocol violation.
    pub fn absorb(&mut self, response: Result<ExecutionResponse, RunError>) -> Step {
        if self.phase != RunPhase::AwaitingResponse {
            return Step::Ignored;
        }
        match response {
            Ok(ExecutionResponse::Output(text)) => {
                self.phase = RunPhase::Done;
                Step::Output(text)
            }
            Ok(ExecutionResponse::Error(message)) => {
                self.phase = RunPhase::Done;
                Step::Failed(RunError::Execution(message))
            }
            Ok(ExecutionResponse::InputRequested(variable)) => {
                if self.inputs.contains(&variable) {
                    self.phase = RunPhase::Done;
                    return Step::Failed(RunError::Protocol(variable));
                }
                self.phase = RunPhase::AwaitingInput;
                self.pending = Some(variable.clone());
                Step::NeedInput(variable)
            }
            Err(err) => {
                self.phase = RunPhase::Done;
                Step::Failed(err)
            }
        }
    }

    /// Record the value for the pending variable and build the follow-up
    /// request. `None` when no input is pending.
    pub fn supply(&mut self, value: impl Into<String>) -> Option<ExecutionRequest> {
        if self.phase != RunPhase::AwaitingInput {
            return None;
        }
        let variable = self.pending.take()?;
        self.inputs.insert(variable, value.into());
        self.phase = RunPhase::AwaitingResponse;
        Some(self.request())
    }

    /// Abandon a run that is waiting for input. Accumulated inputs are
    /// discarded; a later submission starts over from an empty map. Returns
    /// false in any other phase.
    pub fn cancel(&mut self) -> bool {
        if self.phase != RunPhase::AwaitingInput {
            return false;
        }
        self.phase = RunPhase::Done;
        self.pending = None;
        self.inputs = InputMap::new();
        true
    }

    fn request(&self) -> ExecutionRequest {
        ExecutionRequest {
            source: self.source.clone(),
            inputs: self.inputs.clone(),
        }
    }
}

/// Terminal result of one driven run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Output(String),
    Failed(RunError),
    Cancelled,
}

/// Drive one program to completion against a backend, asking `inputs` for
/// each value the service requests.
pub async fn drive<B, I>(backend: &B, source: &str, inputs: &mut I) -> Result<RunOutcome>
where
    B: ExecutionBackend,
    I: InputSource,
{
    let mut session = RunSession::new(source);
    let mut request = session.begin().context("run was already started")?;
    loop {
        let response = backend.execute(&request).await;
        match session.absorb(response) {
            Step::Output(text) => return Ok(RunOutcome::Output(text)),
            Step::Failed(err) => return Ok(RunOutcome::Failed(err)),
            Step::NeedInput(variable) => match inputs.request(&variable)? {
                Some(value) => {
                    request = session
                        .supply(value)
                        .context("no input was pending")?;
                }
                None => {
                    session.cancel();
                    return Ok(RunOutcome::Cancelled);
                }
            },
            // a sequential drive never races its own responses; replay
            // requests are idempotent, so reissuing is harmless
            Step::Ignored => {}
        }
    }
}
