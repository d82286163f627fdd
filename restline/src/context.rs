//! Per-request mutable state shared by the pipeline collaborators
//!
//! One [`Context`] exists per request, exclusively owned by the
//! [`Model`](crate::resource::Model) that created it. Collaborators
//! receive it by mutable reference for the duration of a single call
//! and never retain it, which keeps concurrent requests isolated
//! without locking.

use axum::body::Body as HttpBody;
use axum::extract::Request;
use http::{HeaderMap, Method, Uri};

use crate::action::Action;
use crate::response::Response;

/// The decoded request payload for body-carrying actions.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload<T> {
    /// A single document (insert-one, update, upsert)
    One(T),
    /// A batch of documents (insert-many)
    Many(Vec<T>),
}

/// Mutable state for one request.
///
/// `input` is set exactly once, by the serializer's decode stage, before
/// validation and execution run. `response` accumulates the outcome.
pub struct Context<T> {
    action: Action,
    request: Request,
    /// The decoded request body, absent for bodyless actions.
    pub input: Option<Payload<T>>,
    /// The outbound response being built.
    pub response: Response<T>,
}

impl<T> Context<T> {
    pub(crate) fn new(action: Action, request: Request, default_headers: HeaderMap) -> Self {
        Self {
            action,
            request,
            input: None,
            response: Response::new(default_headers),
        }
    }

    /// The operation this request performs. Immutable after creation.
    pub fn action(&self) -> Action {
        self.action
    }

    /// Method of the inbound request.
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// URI of the inbound request.
    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    /// Headers of the inbound request.
    pub fn request_headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// Take the request body for decoding, leaving an empty body behind.
    /// The body stream can be consumed once; decode is the only caller.
    pub fn take_body(&mut self) -> HttpBody {
        std::mem::replace(self.request.body_mut(), HttpBody::empty())
    }
}
