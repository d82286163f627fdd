//! Outbound response shaping
//!
//! A [`Response`] is the payload a request will answer with: a status
//! that starts unset, a header multimap seeded from the resource
//! defaults, and a typed [`Body`]. Whichever stage determines the
//! outcome sets the status; once set, later stages must not replace it
//! with a success code.

use http::{HeaderMap, StatusCode};

/// The payload a response carries before wire encoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Body<T> {
    /// No payload (no-content outcomes)
    Empty,
    /// A plain human-readable message (error and status-text paths)
    Text(String),
    /// A single stored representation
    Item(T),
    /// A collection of stored representations
    Items(Vec<T>),
}

impl<T> Default for Body<T> {
    fn default() -> Self {
        Self::Empty
    }
}

/// The outbound payload for one request: status code, header multimap
/// and body value. Constructed fresh per request, mutated in place
/// through the pipeline, consumed once when written to the transport.
#[derive(Debug)]
pub struct Response<T> {
    /// Unset until a stage determines the outcome.
    pub status: Option<StatusCode>,
    /// Seeded from the resource's default headers; storage may add more.
    pub headers: HeaderMap,
    /// The value to encode onto the wire.
    pub body: Body<T>,
}

impl<T> Response<T> {
    /// A fresh response seeded with the given default headers.
    pub fn new(headers: HeaderMap) -> Self {
        Self {
            status: None,
            headers,
            body: Body::Empty,
        }
    }

    /// Set the terminal outcome for this request.
    pub fn set(&mut self, status: StatusCode, body: Body<T>) {
        self.status = Some(status);
        self.body = body;
    }

    /// 200 OK with the requested representation.
    pub fn ok(&mut self, body: Body<T>) {
        self.set(StatusCode::OK, body);
    }

    /// 201 Created with the stored representation.
    pub fn created(&mut self, body: Body<T>) {
        self.set(StatusCode::CREATED, body);
    }

    /// 204 No Content.
    pub fn no_content(&mut self) {
        self.set(StatusCode::NO_CONTENT, Body::Empty);
    }

    /// 400 Bad Request with a caller-safe message.
    pub fn bad_request(&mut self, message: impl Into<String>) {
        self.set(StatusCode::BAD_REQUEST, Body::Text(message.into()));
    }

    /// 404 Not Found with the canonical reason phrase.
    pub fn not_found(&mut self) {
        self.set(
            StatusCode::NOT_FOUND,
            Body::Text(reason(StatusCode::NOT_FOUND)),
        );
    }

    /// 500 Internal Server Error with the canonical reason phrase.
    pub fn internal_error(&mut self) {
        self.set(
            StatusCode::INTERNAL_SERVER_ERROR,
            Body::Text(reason(StatusCode::INTERNAL_SERVER_ERROR)),
        );
    }
}

impl<T> Default for Response<T> {
    fn default() -> Self {
        Self::new(HeaderMap::new())
    }
}

/// The canonical reason phrase for a status code.
pub fn reason(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown Status").to_string()
}
