//! # restline
//!
//! Pluggable CRUD request pipeline for HTTP services.
//!
//! A [`Resource`](resource::Resource) names an entity type and bundles
//! three pluggable collaborators — a [`Validator`](validator::Validator),
//! a [`Serializer`](serializer::Serializer) and a
//! [`Storage`](storage::Storage) backend. A [`Service`](service::Service)
//! turns a resource into ready-to-mount HTTP handlers for the seven
//! canonical operations (insert-one, insert-many, update, upsert,
//! find-one, find-many, remove), each running the same fixed pipeline:
//!
//! ```text
//! decode → validate → execute → notify(broker) → record(metrics) → respond
//! ```
//!
//! The pipeline short-circuits to the respond stage on client-input
//! failures, while broker and encode failures keep the final say over
//! the status the client sees. Broker, metrics and logger are
//! cross-cutting and optional; URL-to-handler binding stays with the
//! caller.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use restline::prelude::*;
//!
//! # #[derive(Serialize, Deserialize)]
//! # struct Widget {
//! #     name: String,
//! # }
//! # struct WidgetStore;
//! # #[async_trait]
//! # impl Storage<Widget> for WidgetStore {
//! #     async fn insert_one(&self, _ctx: &mut Context<Widget>) -> Result<()> { unimplemented!() }
//! #     async fn insert_many(&self, _ctx: &mut Context<Widget>) -> Result<()> { unimplemented!() }
//! #     async fn update(&self, _ctx: &mut Context<Widget>) -> Result<()> { unimplemented!() }
//! #     async fn upsert(&self, _ctx: &mut Context<Widget>) -> Result<()> { unimplemented!() }
//! #     async fn find_one(&self, _ctx: &mut Context<Widget>) -> Result<()> { unimplemented!() }
//! #     async fn find_many(&self, _ctx: &mut Context<Widget>) -> Result<()> { unimplemented!() }
//! #     async fn remove(&self, _ctx: &mut Context<Widget>) -> Result<()> { unimplemented!() }
//! # }
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let resource = Arc::new(Resource::new("widget", WidgetStore));
//!     let service = Service::new();
//!
//!     let app = Router::new()
//!         .route(
//!             "/widgets",
//!             post(service.insert_one(&resource)).get(service.find_many(&resource)),
//!         )
//!         .route(
//!             "/widgets/{id}",
//!             get(service.find_one(&resource)).delete(service.remove(&resource)),
//!         );
//!
//!     let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.service.port)).await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod action;
pub mod broker;
pub mod config;
pub mod context;
pub mod error;
pub mod logger;
pub mod metrics;
pub mod observability;
pub mod resource;
pub mod response;
pub mod serializer;
pub mod service;
pub mod storage;
pub mod validator;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::Action;
    pub use crate::broker::{Broker, Event, RequestInfo, ResponseInfo};
    pub use crate::config::{Config, NatsConfig, ServiceConfig};
    pub use crate::context::{Context, Payload};
    pub use crate::error::{Error, Result};
    pub use crate::logger::{Logger, TracingLogger};
    pub use crate::metrics::{Metrics, MetricsSink, ServiceMetrics, Timer};
    pub use crate::observability::init_tracing;
    pub use crate::resource::{Model, Resource};
    pub use crate::response::{Body, Response};
    pub use crate::serializer::{JsonSerializer, Serializer};
    pub use crate::service::{RouteHandler, Service};
    pub use crate::storage::Storage;
    pub use crate::validator::{AcceptAll, Validator};

    #[cfg(feature = "events")]
    pub use crate::broker::NatsBroker;

    pub use axum::{
        extract::Request,
        http::{HeaderMap, HeaderValue, StatusCode},
        response::IntoResponse,
        routing::{delete, get, patch, post, put},
        Router,
    };

    pub use serde::{Deserialize, Serialize};

    // Re-export tracing macros and types
    pub use tracing::{debug, error, info, trace, warn};

    // Re-export tokio for async runtime
    pub use tokio;

    // Re-export async-trait for async trait definitions
    pub use async_trait::async_trait;
}
