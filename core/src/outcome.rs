//! Classified results of a request attempt.
//!
//! # Design
//! A `RequestOutcome` carries a status and body exactly when a response was
//! received. The fields are private and the only constructors are
//! [`RequestOutcome::from_response`], [`RequestOutcome::transient`] and
//! [`RequestOutcome::gave_up`], so an outcome with a status but no response
//! cannot be built.

use std::fmt;

use crate::http::HttpResponse;

/// Category of a request attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Status 200.
    Success,
    /// Status 400..=499. Never retried; retrying could duplicate side effects.
    ClientError,
    /// Status 500..=599. Not retried either.
    ServerError,
    /// No response at all: DNS, connect, reset or timeout.
    TransientNetworkFailure,
    /// Any other status, including non-200 successes.
    UnrecognizedStatus,
    /// The retry policy ran out while failures were still transient.
    GaveUp,
}

impl Classification {
    /// Map a received status code onto a classification.
    pub fn of_status(status: u16) -> Self {
        match status {
            200 => Classification::Success,
            400..=499 => Classification::ClientError,
            500..=599 => Classification::ServerError,
            _ => Classification::UnrecognizedStatus,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Success => "success",
            Classification::ClientError => "client error",
            Classification::ServerError => "server error",
            Classification::TransientNetworkFailure => "transient network failure",
            Classification::UnrecognizedStatus => "unrecognized status",
            Classification::GaveUp => "gave up",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one attempt, or of the final attempt of an `execute` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    classification: Classification,
    response: Option<HttpResponse>,
    attempts: u32,
    last_error: Option<String>,
}

impl RequestOutcome {
    /// A response arrived on attempt number `attempts`.
    pub fn from_response(response: HttpResponse, attempts: u32) -> Self {
        Self {
            classification: Classification::of_status(response.status),
            response: Some(response),
            attempts,
            last_error: None,
        }
    }

    /// Attempt number `attempts` failed before any response arrived.
    pub fn transient(error: impl Into<String>, attempts: u32) -> Self {
        Self {
            classification: Classification::TransientNetworkFailure,
            response: None,
            attempts,
            last_error: Some(error.into()),
        }
    }

    /// The retry budget ran out after `attempts` transient failures.
    pub fn gave_up(error: impl Into<String>, attempts: u32) -> Self {
        Self {
            classification: Classification::GaveUp,
            response: None,
            attempts,
            last_error: Some(error.into()),
        }
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn is_success(&self) -> bool {
        self.classification == Classification::Success
    }

    pub fn status(&self) -> Option<u16> {
        self.response.as_ref().map(|r| r.status)
    }

    pub fn body(&self) -> Option<&str> {
        self.response.as_ref().map(|r| r.body.as_str())
    }

    pub fn response(&self) -> Option<&HttpResponse> {
        self.response.as_ref()
    }

    /// Number of attempts made, counting the one that produced this outcome.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl fmt::Display for RequestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.response, &self.last_error) {
            (Some(resp), _) => write!(f, "{} (HTTP {}): {}", self.classification, resp.status, resp.body),
            (None, Some(err)) => write!(f, "{} after {} attempt(s): {err}", self.classification, self.attempts),
            (None, None) => write!(f, "{}", self.classification),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16) -> HttpResponse {
        HttpResponse {
            status,
            body: "{}".to_string(),
        }
    }

    #[test]
    fn status_classification_boundaries() {
        assert_eq!(Classification::of_status(200), Classification::Success);
        assert_eq!(Classification::of_status(400), Classification::ClientError);
        assert_eq!(Classification::of_status(404), Classification::ClientError);
        assert_eq!(Classification::of_status(499), Classification::ClientError);
        assert_eq!(Classification::of_status(500), Classification::ServerError);
        assert_eq!(Classification::of_status(599), Classification::ServerError);
    }

    #[test]
    fn other_codes_are_unrecognized() {
        for status in [100, 201, 204, 301, 304, 399, 600, 999] {
            assert_eq!(
                Classification::of_status(status),
                Classification::UnrecognizedStatus,
                "status {status}"
            );
        }
    }

    #[test]
    fn received_response_carries_status_and_body() {
        let outcome = RequestOutcome::from_response(response(422), 1);
        assert_eq!(outcome.classification(), Classification::ClientError);
        assert_eq!(outcome.status(), Some(422));
        assert_eq!(outcome.body(), Some("{}"));
        assert!(outcome.last_error().is_none());
    }

    #[test]
    fn transient_failure_has_no_response() {
        let outcome = RequestOutcome::transient("connection refused", 3);
        assert_eq!(outcome.classification(), Classification::TransientNetworkFailure);
        assert!(outcome.status().is_none());
        assert!(outcome.body().is_none());
        assert_eq!(outcome.last_error(), Some("connection refused"));
        assert_eq!(outcome.attempts(), 3);
    }

    #[test]
    fn gave_up_has_no_response() {
        let outcome = RequestOutcome::gave_up("timed out", 7);
        assert_eq!(outcome.classification(), Classification::GaveUp);
        assert!(outcome.response().is_none());
        assert_eq!(outcome.to_string(), "gave up after 7 attempt(s): timed out");
    }
}
