use crate::ServiceFixture;
use fsmcheck_client::{
    ApiRequest, ApiResponse, Connector, RetryPolicy, Retrying, Transport, TransportError,
    TransportErrorKind,
};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// A one-shot failure injected ahead of the fixture's answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    Transport(TransportErrorKind),
    Status(u16),
}

#[derive(Debug, Default)]
struct State {
    fixture: ServiceFixture,
    calls: Vec<ApiRequest>,
    faults: BTreeMap<String, VecDeque<Fault>>,
    refuse_connect: Option<TransportErrorKind>,
    connects: u32,
    releases: u32,
}

/// In-memory service that hands out [`ScriptedHandle`]s wrapped in the real retry decorator.
///
/// Every inner execution is recorded, so retried requests show up once per attempt.
#[derive(Clone, Debug)]
pub struct ScriptedService {
    state: Arc<Mutex<State>>,
    retry: RetryPolicy,
}

impl ScriptedService {
    pub fn new(fixture: ServiceFixture) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                fixture,
                ..State::default()
            })),
            retry: RetryPolicy {
                max_attempts: 3,
                delay: Duration::ZERO,
            },
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fail the next `times` requests whose unencoded path starts with `path_prefix`.
    pub fn inject(&self, path_prefix: &str, fault: Fault, times: usize) {
        let mut state = self.lock();
        let queue = state.faults.entry(path_prefix.to_string()).or_default();
        queue.extend(std::iter::repeat_n(fault, times));
    }

    /// Make every `connect` fail with `kind`.
    pub fn refuse_connect(&self, kind: TransportErrorKind) {
        self.lock().refuse_connect = Some(kind);
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.lock().calls.clone()
    }

    /// `"METHOD /path"` per recorded execution.
    pub fn call_lines(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .map(|c| format!("{} {}", c.method.as_str(), c.path()))
            .collect()
    }

    pub fn connects(&self) -> u32 {
        self.lock().connects
    }

    pub fn releases(&self) -> u32 {
        self.lock().releases
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Connector for ScriptedService {
    type Transport = Retrying<ScriptedHandle>;

    fn connect(&self) -> Result<Self::Transport, TransportError> {
        let mut state = self.lock();
        if let Some(kind) = state.refuse_connect {
            return Err(TransportError::new(kind, "scripted connect failure"));
        }
        state.connects += 1;
        Ok(Retrying::new(
            ScriptedHandle {
                state: Arc::clone(&self.state),
            },
            self.retry.clone(),
        ))
    }
}

/// Transport handed out by [`ScriptedService`]; counts as released when dropped.
#[derive(Debug)]
pub struct ScriptedHandle {
    state: Arc<Mutex<State>>,
}

impl ScriptedHandle {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Transport for ScriptedHandle {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut state = self.lock();
        state.calls.push(request.clone());

        let path = request.path();
        let fault = state
            .faults
            .iter_mut()
            .find(|(prefix, queue)| path.starts_with(prefix.as_str()) && !queue.is_empty())
            .and_then(|(_, queue)| queue.pop_front());
        match fault {
            Some(Fault::Transport(kind)) => {
                return Err(TransportError::new(kind, format!("scripted {kind}")));
            }
            Some(Fault::Status(status)) => return Ok(ApiResponse::new(status, Vec::new())),
            None => {}
        }

        let (status, body) = state
            .fixture
            .respond(request.method.as_str(), &path, &request.query);
        Ok(ApiResponse::new(status, body))
    }
}

impl Drop for ScriptedHandle {
    fn drop(&mut self) {
        self.lock().releases += 1;
    }
}
