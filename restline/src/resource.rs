//! Per-resource configuration and the per-request model it produces
//!
//! A [`Resource`] is built once at application start and is immutable
//! afterwards, so it is shared read-only across concurrent requests.
//! Each inbound request gets a fresh [`Model`]: one new [`Context`] plus
//! cheap clones of the resource's collaborator handles.

use std::sync::Arc;

use axum::extract::Request;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::action::Action;
use crate::context::Context;
use crate::error::Result;
use crate::response::Body;
use crate::serializer::{JsonSerializer, Serializer};
use crate::storage::Storage;
use crate::validator::{AcceptAll, Validator};

/// Configuration bundle for one named entity type: the three pluggable
/// collaborators plus default response headers.
///
/// Configuration is fluent and idempotent; the last call for a slot
/// wins. Defaults: JSON serializer, accept-all validator, and a
/// `Content-Type: application/json` response header.
pub struct Resource<T> {
    name: String,
    default_headers: HeaderMap,
    validator: Arc<dyn Validator<T>>,
    serializer: Arc<dyn Serializer<T>>,
    storage: Arc<dyn Storage<T>>,
}

impl<T> Resource<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Create a resource with the given name and storage backend.
    pub fn new(name: impl Into<String>, storage: impl Storage<T> + 'static) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            name: name.into(),
            default_headers,
            validator: Arc::new(AcceptAll),
            serializer: Arc::new(JsonSerializer),
            storage: Arc::new(storage),
        }
    }

    /// Replace the validator.
    pub fn with_validator(mut self, validator: impl Validator<T> + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Replace the wire codec.
    pub fn with_serializer(mut self, serializer: impl Serializer<T> + 'static) -> Self {
        self.serializer = Arc::new(serializer);
        self
    }

    /// Replace the storage backend.
    pub fn with_storage(mut self, storage: impl Storage<T> + 'static) -> Self {
        self.storage = Arc::new(storage);
        self
    }

    /// Set a default response header, replacing any previous value for
    /// the same name.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.default_headers.insert(name, value);
        self
    }

    /// The resource name, as used in event names.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Allocate a fresh context and model for one inbound request.
    ///
    /// Safe to call concurrently; the resource itself is read-only here.
    pub fn model(&self, request: Request, action: Action) -> Model<T> {
        Model {
            context: Context::new(action, request, self.default_headers.clone()),
            validator: Arc::clone(&self.validator),
            serializer: Arc::clone(&self.serializer),
            storage: Arc::clone(&self.storage),
        }
    }
}

/// The per-request binding of one resource's collaborators to a fresh
/// [`Context`]. Transient: created by [`Resource::model`], consumed when
/// the response is written.
pub struct Model<T> {
    /// Request-scoped state, exclusively owned by this model.
    pub context: Context<T>,
    validator: Arc<dyn Validator<T>>,
    serializer: Arc<dyn Serializer<T>>,
    storage: Arc<dyn Storage<T>>,
}

impl<T> Model<T> {
    /// Run the serializer's decode stage.
    pub async fn decode(&mut self) -> Result<()> {
        self.serializer.decode(&mut self.context).await
    }

    /// Run the validation stage.
    pub async fn validate(&mut self) -> Result<()> {
        self.validator.validate(&mut self.context).await
    }

    /// Dispatch to the storage operation matching `action`.
    ///
    /// Storage methods set the response status and body themselves;
    /// correct dispatch is this method's only job.
    pub async fn execute(&mut self, action: Action) -> Result<()> {
        let ctx = &mut self.context;
        match action {
            Action::InsertOne => self.storage.insert_one(ctx).await,
            Action::InsertMany => self.storage.insert_many(ctx).await,
            Action::Update => self.storage.update(ctx).await,
            Action::Upsert => self.storage.upsert(ctx).await,
            Action::FindOne => self.storage.find_one(ctx).await,
            Action::FindMany => self.storage.find_many(ctx).await,
            Action::Remove => self.storage.remove(ctx).await,
        }
    }

    /// Encode a response body with the resource's serializer.
    pub fn encode(&self, body: &Body<T>) -> Result<Vec<u8>> {
        self.serializer.encode(body)
    }

    /// Surrender the request-scoped state for the respond stage.
    pub fn into_context(self) -> Context<T> {
        self.context
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use axum::body::Body as HttpBody;
    use http::StatusCode;
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        name: String,
    }

    struct NullStorage;

    #[async_trait]
    impl Storage<Widget> for NullStorage {
        async fn insert_one(&self, ctx: &mut Context<Widget>) -> Result<()> {
            ctx.response.created(Body::Empty);
            Ok(())
        }
        async fn insert_many(&self, ctx: &mut Context<Widget>) -> Result<()> {
            ctx.response.created(Body::Empty);
            Ok(())
        }
        async fn update(&self, ctx: &mut Context<Widget>) -> Result<()> {
            ctx.response.no_content();
            Ok(())
        }
        async fn upsert(&self, ctx: &mut Context<Widget>) -> Result<()> {
            ctx.response.ok(Body::Empty);
            Ok(())
        }
        async fn find_one(&self, ctx: &mut Context<Widget>) -> Result<()> {
            ctx.response.ok(Body::Empty);
            Ok(())
        }
        async fn find_many(&self, ctx: &mut Context<Widget>) -> Result<()> {
            ctx.response.ok(Body::Items(Vec::new()));
            Ok(())
        }
        async fn remove(&self, ctx: &mut Context<Widget>) -> Result<()> {
            ctx.response.no_content();
            Ok(())
        }
    }

    fn get(uri: &str) -> Request {
        Request::builder().uri(uri).body(HttpBody::empty()).unwrap()
    }

    #[test]
    fn model_seeds_the_context_from_the_resource() {
        let resource = Resource::new("widget", NullStorage)
            .with_header(HeaderName::from_static("x-service"), HeaderValue::from_static("demo"));
        let model = resource.model(get("/widgets"), Action::FindMany);

        assert_eq!(model.context.action(), Action::FindMany);
        assert_eq!(
            model.context.response.headers.get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(model.context.response.headers.get("x-service").unwrap(), "demo");
        assert!(model.context.response.status.is_none());
    }

    #[test]
    fn header_configuration_is_last_call_wins() {
        let resource = Resource::new("widget", NullStorage)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/xml"))
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let model = resource.model(get("/widgets"), Action::FindMany);
        assert_eq!(
            model.context.response.headers.get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[tokio::test]
    async fn execute_dispatches_to_the_matching_operation() {
        let resource = Resource::new("widget", NullStorage);
        for (action, expected) in [
            (Action::InsertOne, StatusCode::CREATED),
            (Action::InsertMany, StatusCode::CREATED),
            (Action::Update, StatusCode::NO_CONTENT),
            (Action::Upsert, StatusCode::OK),
            (Action::FindOne, StatusCode::OK),
            (Action::FindMany, StatusCode::OK),
            (Action::Remove, StatusCode::NO_CONTENT),
        ] {
            let mut model = resource.model(get("/widgets"), action);
            model.execute(action).await.unwrap();
            assert_eq!(model.context.response.status, Some(expected));
        }
    }
}
