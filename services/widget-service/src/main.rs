//! Widget API: an in-memory resource served through the restline
//! pipeline.
//!
//! Demonstrates the full wiring: a storage backend over a concurrent
//! map, a validator enforcing input shape and URL ids, figment
//! configuration, JSON tracing, an optional NATS broker, and the seven
//! generated handlers mounted on an axum router.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use restline::prelude::*;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Widget {
    #[serde(default)]
    id: Option<Uuid>,
    name: String,
    age: u32,
}

/// Concurrent in-memory widget store.
#[derive(Default)]
struct WidgetStore {
    items: DashMap<Uuid, Widget>,
}

/// The document id addressed by the request URL, when one is present.
fn path_id(ctx: &Context<Widget>) -> Option<Uuid> {
    ctx.uri()
        .path()
        .rsplit('/')
        .next()
        .and_then(|segment| Uuid::parse_str(segment).ok())
}

impl WidgetStore {
    fn addressed_id(&self, ctx: &mut Context<Widget>) -> Result<Uuid> {
        match path_id(ctx) {
            Some(id) => Ok(id),
            None => {
                // The validator vouches for the id segment; reaching
                // this branch means a route was mounted without one.
                ctx.response.internal_error();
                Err(Error::Storage("request URL carries no document id".to_string()))
            }
        }
    }
}

#[async_trait]
impl Storage<Widget> for WidgetStore {
    async fn insert_one(&self, ctx: &mut Context<Widget>) -> Result<()> {
        let Some(Payload::One(mut widget)) = ctx.input.take() else {
            ctx.response.internal_error();
            return Err(Error::Storage("insert without a decoded document".to_string()));
        };
        let id = widget.id.unwrap_or_else(Uuid::new_v4);
        widget.id = Some(id);
        self.items.insert(id, widget.clone());
        ctx.response.created(Body::Item(widget));
        Ok(())
    }

    async fn insert_many(&self, ctx: &mut Context<Widget>) -> Result<()> {
        let Some(Payload::Many(widgets)) = ctx.input.take() else {
            ctx.response.internal_error();
            return Err(Error::Storage("bulk insert without a decoded batch".to_string()));
        };
        let mut stored = Vec::with_capacity(widgets.len());
        for mut widget in widgets {
            let id = widget.id.unwrap_or_else(Uuid::new_v4);
            widget.id = Some(id);
            self.items.insert(id, widget.clone());
            stored.push(widget);
        }
        ctx.response.created(Body::Items(stored));
        Ok(())
    }

    async fn update(&self, ctx: &mut Context<Widget>) -> Result<()> {
        let id = self.addressed_id(ctx)?;
        let Some(Payload::One(mut widget)) = ctx.input.take() else {
            ctx.response.internal_error();
            return Err(Error::Storage("update without a decoded document".to_string()));
        };
        widget.id = Some(id);
        match self.items.get_mut(&id) {
            Some(mut entry) => {
                *entry = widget;
                ctx.response.no_content();
            }
            None => ctx.response.not_found(),
        }
        Ok(())
    }

    async fn upsert(&self, ctx: &mut Context<Widget>) -> Result<()> {
        let id = self.addressed_id(ctx)?;
        let Some(Payload::One(mut widget)) = ctx.input.take() else {
            ctx.response.internal_error();
            return Err(Error::Storage("upsert without a decoded document".to_string()));
        };
        widget.id = Some(id);
        self.items.insert(id, widget.clone());
        ctx.response.ok(Body::Item(widget));
        Ok(())
    }

    async fn find_one(&self, ctx: &mut Context<Widget>) -> Result<()> {
        let id = self.addressed_id(ctx)?;
        match self.items.get(&id) {
            Some(entry) => ctx.response.ok(Body::Item(entry.value().clone())),
            None => ctx.response.not_found(),
        }
        Ok(())
    }

    async fn find_many(&self, ctx: &mut Context<Widget>) -> Result<()> {
        let widgets: Vec<Widget> = self.items.iter().map(|entry| entry.value().clone()).collect();
        ctx.response.ok(Body::Items(widgets));
        Ok(())
    }

    async fn remove(&self, ctx: &mut Context<Widget>) -> Result<()> {
        let id = self.addressed_id(ctx)?;
        match self.items.remove(&id) {
            Some(_) => ctx.response.no_content(),
            None => ctx.response.not_found(),
        }
        Ok(())
    }
}

/// Rejects widgets without a name and id-addressed requests whose URL
/// segment is not a UUID.
struct WidgetValidator;

#[async_trait]
impl Validator<Widget> for WidgetValidator {
    async fn validate(&self, ctx: &mut Context<Widget>) -> Result<()> {
        match ctx.action() {
            Action::Update | Action::Upsert | Action::FindOne | Action::Remove => {
                if path_id(ctx).is_none() {
                    ctx.response.bad_request("a widget id is required in the URL");
                    return Err(Error::Validation("missing widget id".to_string()));
                }
            }
            Action::InsertOne | Action::InsertMany | Action::FindMany => {}
        }

        let named = match &ctx.input {
            Some(Payload::One(widget)) => !widget.name.is_empty(),
            Some(Payload::Many(widgets)) => widgets.iter().all(|widget| !widget.name.is_empty()),
            None => return Ok(()),
        };
        if !named {
            ctx.response.bad_request("a widget needs a name");
            return Err(Error::Validation("unnamed widget".to_string()));
        }
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_else(|err| {
        eprintln!("Warning: failed to load config: {err}, using defaults");
        Config::default()
    });

    init_tracing(&config)?;

    let resource = Arc::new(Resource::new("widget", WidgetStore::default()).with_validator(WidgetValidator));

    let mut service = Service::new();
    if let Some(nats) = &config.nats {
        service = service.with_broker(NatsBroker::connect(nats).await?);
    }

    let app = Router::new()
        .route(
            "/widgets",
            post(service.insert_one(&resource)).get(service.find_many(&resource)),
        )
        .route("/widgets/batch", post(service.insert_many(&resource)))
        .route(
            "/widgets/{id}",
            get(service.find_one(&resource))
                .put(service.upsert(&resource))
                .patch(service.update(&resource))
                .delete(service.remove(&resource)),
        )
        .layer(TraceLayer::new_for_http());

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.service.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting {} on {}", config.service.name, addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use axum::body::Body as HttpBody;
    use http::Method;
    use restline::resource::Model;

    use super::*;

    fn model_for(store: WidgetStore, method: Method, uri: &str, action: Action) -> Model<Widget> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(HttpBody::empty())
            .unwrap();
        Resource::new("widget", store)
            .with_validator(WidgetValidator)
            .model(request, action)
    }

    #[tokio::test]
    async fn find_many_lists_inserted_widgets() {
        let store = WidgetStore::default();
        let id = Uuid::new_v4();
        store.items.insert(
            id,
            Widget {
                id: Some(id),
                name: "gadget".to_string(),
                age: 3,
            },
        );

        let mut model = model_for(store, Method::GET, "/widgets", Action::FindMany);
        model.execute(Action::FindMany).await.unwrap();

        assert_eq!(model.context.response.status, Some(StatusCode::OK));
        match &model.context.response.body {
            Body::Items(widgets) => assert_eq!(widgets.len(), 1),
            other => panic!("expected a list body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn remove_of_a_missing_widget_reports_not_found() {
        let uri = format!("/widgets/{}", Uuid::new_v4());

        let mut model =
            model_for(WidgetStore::default(), Method::DELETE, &uri, Action::Remove);
        model.execute(Action::Remove).await.unwrap();

        assert_eq!(model.context.response.status, Some(StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn validator_rejects_a_non_uuid_id_segment() {
        let mut model = model_for(
            WidgetStore::default(),
            Method::DELETE,
            "/widgets/not-a-uuid",
            Action::Remove,
        );
        let err = model.validate().await.unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(model.context.response.status, Some(StatusCode::BAD_REQUEST));
    }
}
