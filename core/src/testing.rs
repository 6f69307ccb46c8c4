//! In-memory transport and sleeper fakes shared by the unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use crate::executor::{Sleeper, Transport, TransportError};
use crate::http::{HttpRequest, HttpResponse};

pub(crate) type Scripted = Result<HttpResponse, TransportError>;

pub(crate) fn ok(status: u16, body: &str) -> Scripted {
    Ok(HttpResponse {
        status,
        body: body.to_string(),
    })
}

pub(crate) fn network_error(msg: &str) -> Scripted {
    Err(TransportError::Network(msg.to_string()))
}

/// Replays scripted results in order and records every request it sees.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    script: RefCell<VecDeque<Scripted>>,
    seen: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: RefCell::new(script.into()),
            seen: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.seen.borrow().len()
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.seen.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.borrow_mut().push(request.clone());
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted result left for {} {}", request.method, request.url))
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingSleeper {
    slept: RefCell<Vec<Duration>>,
}

impl RecordingSleeper {
    pub(crate) fn slept(&self) -> Vec<Duration> {
        self.slept.borrow().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.borrow_mut().push(duration);
    }
}
