//! Wire-format (de)serialization contract and the JSON reference codec

use async_trait::async_trait;
use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::action::Action;
use crate::context::{Context, Payload};
use crate::error::{Error, Result};
use crate::response::Body;

/// Largest request body the JSON codec will buffer.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Wire codec bound to a resource: decodes request bodies into the
/// resource type and encodes response bodies to bytes.
#[async_trait]
pub trait Serializer<T>: Send + Sync {
    /// Decode the request body into `Context::input`.
    ///
    /// Must set a client-error response and return `Err` on malformed
    /// input; a no-op `Ok` that leaves `input` untouched is valid for
    /// bodyless requests.
    async fn decode(&self, ctx: &mut Context<T>) -> Result<()>;

    /// Encode a response body to wire bytes. Failure here is an
    /// infrastructure failure, not a client error.
    fn encode(&self, body: &Body<T>) -> Result<Vec<u8>>;
}

/// The reference JSON codec. Bulk-insert input and output use arrays;
/// requests without a body-carrying method (POST/PUT/PATCH) are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

#[async_trait]
impl<T> Serializer<T> for JsonSerializer
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn decode(&self, ctx: &mut Context<T>) -> Result<()> {
        let method = ctx.method();
        if method != Method::POST && method != Method::PUT && method != Method::PATCH {
            return Ok(());
        }

        let body = ctx.take_body();
        let bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(err) => {
                ctx.response.bad_request(err.to_string());
                return Err(Error::Decode(err.to_string()));
            }
        };

        let input = if ctx.action() == Action::InsertMany {
            serde_json::from_slice::<Vec<T>>(&bytes).map(Payload::Many)
        } else {
            serde_json::from_slice::<T>(&bytes).map(Payload::One)
        };

        match input {
            Ok(input) => {
                ctx.input = Some(input);
                Ok(())
            }
            Err(err) => {
                // Parse errors are caller-safe; echo them as the body.
                ctx.response.bad_request(err.to_string());
                Err(Error::Decode(err.to_string()))
            }
        }
    }

    fn encode(&self, body: &Body<T>) -> Result<Vec<u8>> {
        let encoded = match body {
            Body::Empty => return Ok(Vec::new()),
            Body::Text(message) => serde_json::to_vec(message),
            Body::Item(item) => serde_json::to_vec(item),
            Body::Items(items) => serde_json::to_vec(items),
        };
        encoded.map_err(|err| Error::Encode(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body as HttpBody;
    use axum::extract::Request;
    use http::{HeaderMap, StatusCode};
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        name: String,
        age: u32,
    }

    fn context(method: Method, action: Action, body: &str) -> Context<Widget> {
        let request = Request::builder()
            .method(method)
            .uri("/widgets")
            .body(HttpBody::from(body.to_string()))
            .unwrap();
        Context::new(action, request, HeaderMap::new())
    }

    #[tokio::test]
    async fn decode_parses_a_single_document() {
        let mut ctx = context(
            Method::POST,
            Action::InsertOne,
            r#"{"name":"Otieno Kamau","age":21}"#,
        );
        JsonSerializer.decode(&mut ctx).await.unwrap();
        assert_eq!(
            ctx.input,
            Some(Payload::One(Widget {
                name: "Otieno Kamau".to_string(),
                age: 21,
            }))
        );
        assert!(ctx.response.status.is_none());
    }

    #[tokio::test]
    async fn decode_parses_an_array_for_bulk_insert() {
        let mut ctx = context(
            Method::POST,
            Action::InsertMany,
            r#"[{"name":"a","age":1},{"name":"b","age":2}]"#,
        );
        JsonSerializer.decode(&mut ctx).await.unwrap();
        match ctx.input {
            Some(Payload::Many(ref widgets)) => assert_eq!(widgets.len(), 2),
            ref other => panic!("expected a batch payload, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn decode_rejects_malformed_json_with_a_bad_request_response() {
        let mut ctx = context(Method::POST, Action::InsertOne, "bad body");
        let err = JsonSerializer.decode(&mut ctx).await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
        assert_eq!(ctx.response.status, Some(StatusCode::BAD_REQUEST));
        assert!(ctx.input.is_none());
    }

    #[tokio::test]
    async fn decode_is_a_no_op_for_bodyless_methods() {
        let mut ctx = context(Method::GET, Action::FindMany, "ignored");
        JsonSerializer.decode(&mut ctx).await.unwrap();
        assert!(ctx.input.is_none());
        assert!(ctx.response.status.is_none());
    }

    #[test]
    fn encode_quotes_text_bodies() {
        let bytes = Serializer::<Widget>::encode(&JsonSerializer, &Body::Text("Created".to_string())).unwrap();
        assert_eq!(bytes, b"\"Created\"");
    }

    #[test]
    fn encode_produces_no_bytes_for_empty_bodies() {
        let bytes = Serializer::<Widget>::encode(&JsonSerializer, &Body::Empty).unwrap();
        assert!(bytes.is_empty());
    }

    #[test]
    fn encode_serializes_items_as_an_array() {
        let widgets = vec![Widget { name: "a".to_string(), age: 1 }];
        let bytes = Serializer::<Widget>::encode(&JsonSerializer, &Body::Items(widgets)).unwrap();
        assert_eq!(bytes, br#"[{"name":"a","age":1}]"#);
    }
}
