//! The request pipeline: decode → validate → execute → notify → record
//! → respond
//!
//! [`Service`] holds the optional cross-cutting collaborators (broker,
//! metrics, logger) and exposes one handler builder per action. All
//! seven run the same fixed pipeline over a fresh [`Model`] obtained
//! from the resource, short-circuiting to the respond stage on the
//! first client-input failure.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body as HttpBody;
use axum::extract::Request;
use axum::handler::Handler;
use axum::response::Response as HttpResponse;
use futures::future::BoxFuture;
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::action::Action;
use crate::broker::{Broker, Event, RequestInfo, ResponseInfo};
use crate::logger::{Logger, TracingLogger};
use crate::metrics::Metrics;
use crate::resource::{Model, Resource};
use crate::response::reason;

/// Application-scoped pipeline orchestrator.
///
/// Broker and metrics are optional; their absence skips the notify and
/// record stages without affecting the response. The logger defaults to
/// [`TracingLogger`]. Cloning is cheap: every handler holds its own
/// clone.
#[derive(Clone)]
pub struct Service {
    broker: Option<Arc<dyn Broker>>,
    metrics: Option<Arc<dyn Metrics>>,
    logger: Arc<dyn Logger>,
}

impl Default for Service {
    fn default() -> Self {
        Self {
            broker: None,
            metrics: None,
            logger: Arc::new(TracingLogger),
        }
    }
}

impl Service {
    /// A service with no broker, no metrics and the tracing logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish an event for every pipeline run through `broker`.
    pub fn with_broker(mut self, broker: impl Broker + 'static) -> Self {
        self.broker = Some(Arc::new(broker));
        self
    }

    /// Record per-event counters and timings through `metrics`.
    pub fn with_metrics(mut self, metrics: impl Metrics + 'static) -> Self {
        self.metrics = Some(Arc::new(metrics));
        self
    }

    /// Replace the logger.
    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// Build a handler that creates one document.
    pub fn insert_one<T>(&self, resource: &Arc<Resource<T>>) -> RouteHandler
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.handler(resource, Action::InsertOne)
    }

    /// Build a handler that creates a batch of documents.
    pub fn insert_many<T>(&self, resource: &Arc<Resource<T>>) -> RouteHandler
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.handler(resource, Action::InsertMany)
    }

    /// Build a handler that updates a document selected by the request.
    pub fn update<T>(&self, resource: &Arc<Resource<T>>) -> RouteHandler
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.handler(resource, Action::Update)
    }

    /// Build a handler that creates a document or updates it in place.
    pub fn upsert<T>(&self, resource: &Arc<Resource<T>>) -> RouteHandler
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.handler(resource, Action::Upsert)
    }

    /// Build a handler that returns one document.
    pub fn find_one<T>(&self, resource: &Arc<Resource<T>>) -> RouteHandler
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.handler(resource, Action::FindOne)
    }

    /// Build a handler that lists documents.
    pub fn find_many<T>(&self, resource: &Arc<Resource<T>>) -> RouteHandler
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.handler(resource, Action::FindMany)
    }

    /// Build a handler that deletes a document selected by the request.
    pub fn remove<T>(&self, resource: &Arc<Resource<T>>) -> RouteHandler
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        self.handler(resource, Action::Remove)
    }

    fn handler<T>(&self, resource: &Arc<Resource<T>>, action: Action) -> RouteHandler
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let service = self.clone();
        let resource = Arc::clone(resource);
        RouteHandler {
            inner: Arc::new(move |request: Request| {
                let service = service.clone();
                let resource = Arc::clone(&resource);
                Box::pin(async move { service.process(&resource, action, request).await })
            }),
        }
    }

    /// Run the fixed pipeline for one request and produce the transport
    /// response.
    async fn process<T>(
        &self,
        resource: &Resource<T>,
        action: Action,
        request: Request,
    ) -> HttpResponse
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let started = Instant::now();
        let event = format!("{}_{}", resource.name(), action);
        let mut model = resource.model(request, action);

        self.run_stages(&mut model, action, &event, started).await;

        self.respond(model)
    }

    async fn run_stages<T>(
        &self,
        model: &mut Model<T>,
        action: Action,
        event: &str,
        started: Instant,
    ) where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        if let Err(err) = model.decode().await {
            self.logger.error(&err);
            if model.context.response.status.is_none() {
                model.context.response.bad_request(reason(StatusCode::BAD_REQUEST));
            }
            return;
        }

        if let Err(err) = model.validate().await {
            self.logger.error(&err);
            if model.context.response.status.is_none() {
                model.context.response.bad_request(reason(StatusCode::BAD_REQUEST));
            }
            return;
        }

        // A storage failure does not short-circuit the notify/record
        // stages; the broker and the encoder keep the final say over
        // the status the client sees.
        if let Err(err) = model.execute(action).await {
            self.logger.error(&err);
            if model.context.response.status.is_none() {
                model.context.response.internal_error();
            }
        }

        if let Some(broker) = &self.broker {
            let payload = self.event_snapshot(model, event);
            if let Err(err) = broker.publish(event, &payload).await {
                // A write the rest of the system was never told about is
                // reported to the client as a failure.
                model.context.response.status = Some(StatusCode::INTERNAL_SERVER_ERROR);
                self.logger.error(&err);
            }
        }

        if let Some(metrics) = &self.metrics {
            metrics.incr(event, 1);
            metrics.timing(event, started.elapsed());
        }
    }

    fn event_snapshot<T>(&self, model: &Model<T>, event: &str) -> Event
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let body = match model.encode(&model.context.response.body) {
            Ok(bytes) if bytes.is_empty() => None,
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(err) => {
                self.logger.warning(&err);
                None
            }
        };

        Event::new(
            event.to_string(),
            RequestInfo {
                method: model.context.method().to_string(),
                uri: model.context.uri().to_string(),
            },
            ResponseInfo {
                status: model.context.response.status.map(|status| status.as_u16()),
                body,
            },
        )
    }

    /// Encode the response body and write status, headers and bytes onto
    /// the transport response. An encode failure forces 500 with a
    /// generic plain-text body, overriding anything set earlier: the
    /// client cannot be sent a value the process cannot serialize.
    fn respond<T>(&self, model: Model<T>) -> HttpResponse
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let encoded = model.encode(&model.context.response.body);
        let mut context = model.into_context();

        let (status, bytes) = match encoded {
            Ok(bytes) => (
                context
                    .response
                    .status
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                bytes,
            ),
            Err(err) => {
                self.logger.error(&err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    reason(StatusCode::INTERNAL_SERVER_ERROR).into_bytes(),
                )
            }
        };

        let mut response = HttpResponse::new(HttpBody::from(bytes));
        *response.status_mut() = status;
        *response.headers_mut() = std::mem::take(&mut context.response.headers);
        response
    }
}

/// A ready-to-mount request handler bound to one resource and action.
///
/// Pass it to the axum routing verbs; URL-to-handler binding stays with
/// the caller:
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/widgets", post(service.insert_one(&resource)))
///     .route("/widgets/{id}", delete(service.remove(&resource)));
/// ```
#[derive(Clone)]
pub struct RouteHandler {
    inner: Arc<dyn Fn(Request) -> BoxFuture<'static, HttpResponse> + Send + Sync>,
}

impl<S> Handler<((),), S> for RouteHandler {
    type Future = BoxFuture<'static, HttpResponse>;

    fn call(self, req: Request, _state: S) -> Self::Future {
        (self.inner)(req)
    }
}
