//! Response classification
//!
//! The backend signals an expired or invalid session with a JSON body
//! carrying `status_code: 401`. Other deployments may only use the HTTP
//! status line. Classification sits behind [`ResponseClassifier`] so either
//! policy can be plugged into [`crate::ApiClient`] without touching callers.

use serde::Deserialize;

/// HTTP status signalling an invalid session
pub const UNAUTHORIZED: u16 = 401;

/// Outcome of classifying a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    /// 2xx; the body should be decoded
    Success,
    /// The session is no longer valid
    AuthRejected,
    /// Any other error response
    Failure,
}

/// Decides what a received response means
pub trait ResponseClassifier: Send + Sync + std::fmt::Debug {
    /// Classify a response from its HTTP status and raw body
    fn classify(&self, status: u16, body: &[u8]) -> ResponseClass;
}

#[derive(Deserialize)]
struct EmbeddedStatus {
    status_code: Option<u16>,
}

/// Reads the session verdict from `status_code` inside the error body
///
/// This is the default. 2xx responses are always successes; the body of an
/// error response decides between rejection and plain failure regardless of
/// the status line.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyStatusClassifier;

impl ResponseClassifier for BodyStatusClassifier {
    fn classify(&self, status: u16, body: &[u8]) -> ResponseClass {
        if (200..300).contains(&status) {
            return ResponseClass::Success;
        }

        match serde_json::from_slice::<EmbeddedStatus>(body) {
            Ok(EmbeddedStatus { status_code: Some(UNAUTHORIZED) }) => ResponseClass::AuthRejected,
            _ => ResponseClass::Failure,
        }
    }
}

/// Treats HTTP 401 on the status line as a session rejection
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpStatusClassifier;

impl ResponseClassifier for HttpStatusClassifier {
    fn classify(&self, status: u16, _body: &[u8]) -> ResponseClass {
        match status {
            200..=299 => ResponseClass::Success,
            UNAUTHORIZED => ResponseClass::AuthRejected,
            _ => ResponseClass::Failure,
        }
    }
}
