//! Fakes shared by the unit tests.

use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use tokio::sync::Semaphore;

use crate::api::{FetchError, Request, Transport};
use crate::notify::{ErrorNotice, ErrorNotifier};

#[derive(Default)]
pub struct CountingNotifier {
    notices: Mutex<Vec<ErrorNotice>>,
}

impl CountingNotifier {
    pub fn count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }

    pub fn notices(&self) -> Vec<ErrorNotice> {
        self.notices.lock().unwrap().clone()
    }
}

impl ErrorNotifier for CountingNotifier {
    fn notify(&self, notice: &ErrorNotice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

pub struct PanickingNotifier;

impl ErrorNotifier for PanickingNotifier {
    fn notify(&self, _notice: &ErrorNotice) {
        panic!("notifier failure");
    }
}

type Responder = dyn Fn(&Request) -> Result<Value, FetchError> + Send + Sync;

/// Transport that records every request and answers through a closure.
/// With a gate, each request waits for one semaphore permit first.
pub struct RecordingTransport {
    requests: Mutex<Vec<Request>>,
    respond: Box<Responder>,
    gate: Option<Arc<Semaphore>>,
}

impl RecordingTransport {
    pub fn new(respond: impl Fn(&Request) -> Result<Value, FetchError> + Send + Sync + 'static) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            respond: Box::new(respond),
            gate: None,
        }
    }

    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    fn send(&self, request: Request) -> BoxFuture<'_, Result<Value, FetchError>> {
        self.requests.lock().unwrap().push(request.clone());
        async move {
            if let Some(gate) = &self.gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }
            (self.respond)(&request)
        }
        .boxed()
    }
}
