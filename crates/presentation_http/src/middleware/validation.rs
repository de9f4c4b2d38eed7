//! Schema validation middleware
//!
//! A per-route layer that extracts raw input from up to three sources
//! (JSON body, query string, route path parameters), validates each against
//! a named contract from the schema catalog, and attaches the normalized
//! values to the request extensions as [`ValidatedData`].
//!
//! Sources are checked in body, query, params order and the first failing
//! source short-circuits with the standard validation envelope (HTTP 400)
//! or a custom responder when one is installed. Handlers behind this layer
//! can rely on every declared default being present and every coercion
//! applied.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    extract::{FromRequestParts, RawPathParams, Request},
    http::Method,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tower::{Layer, Service};
use tracing::error;

use crate::{
    error::ApiError,
    schema::{Coerce, FieldError, Schema},
};

/// Schemas to apply per source
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationSpec {
    body: Option<&'static Schema>,
    query: Option<&'static Schema>,
    params: Option<&'static Schema>,
}

impl ValidationSpec {
    /// An empty spec; combine with the builder methods
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the JSON body against `schema`
    #[must_use]
    pub fn body(mut self, schema: &'static Schema) -> Self {
        self.body = Some(schema);
        self
    }

    /// Validate the query string against `schema`
    #[must_use]
    pub fn query(mut self, schema: &'static Schema) -> Self {
        self.query = Some(schema);
        self
    }

    /// Validate route path parameters against `schema`
    #[must_use]
    pub fn params(mut self, schema: &'static Schema) -> Self {
        self.params = Some(schema);
        self
    }
}

/// Normalized values produced by the validation layer
///
/// Only the sources a schema was supplied for are populated; body stays
/// `None` on GET requests in combined mode.
#[derive(Debug, Clone, Default)]
pub struct ValidatedData {
    /// Normalized body value
    pub body: Option<Value>,
    /// Normalized query value
    pub query: Option<Value>,
    /// Normalized path parameter value
    pub params: Option<Value>,
}

impl ValidatedData {
    /// Deserialize the validated body into a typed value
    ///
    /// The shape was already validated; a mismatch here is a programming
    /// error between schema and handler type and surfaces as a 500.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Self::convert(self.body.as_ref(), "body")
    }

    /// Deserialize the validated query into a typed value
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Self::convert(self.query.as_ref(), "query")
    }

    /// Deserialize the validated path parameters into a typed value
    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Self::convert(self.params.as_ref(), "params")
    }

    fn convert<T: DeserializeOwned>(value: Option<&Value>, source: &str) -> Result<T, ApiError> {
        let value = value
            .ok_or_else(|| ApiError::Internal(format!("validated {source} was not populated")))?;
        serde_json::from_value(value.clone())
            .map_err(|e| ApiError::Internal(format!("validated {source} shape mismatch: {e}")))
    }
}

type ErrorResponder = Arc<dyn Fn(&[FieldError]) -> Response + Send + Sync>;

/// Layer applying schema validation to a single route
#[derive(Clone)]
pub struct ValidationLayer {
    spec: ValidationSpec,
    /// Body is the sole declared source; GET is refused instead of skipped
    single_source_body: bool,
    on_error: Option<ErrorResponder>,
}

impl std::fmt::Debug for ValidationLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationLayer")
            .field("spec", &self.spec)
            .field("single_source_body", &self.single_source_body)
            .field("custom_on_error", &self.on_error.is_some())
            .finish()
    }
}

impl ValidationLayer {
    /// Validate only the JSON body
    ///
    /// GET requests are refused with a 400; body validation is meaningless
    /// for them.
    #[must_use]
    pub fn body(schema: &'static Schema) -> Self {
        Self {
            spec: ValidationSpec::new().body(schema),
            single_source_body: true,
            on_error: None,
        }
    }

    /// Validate only the query string
    #[must_use]
    pub fn query(schema: &'static Schema) -> Self {
        Self {
            spec: ValidationSpec::new().query(schema),
            single_source_body: false,
            on_error: None,
        }
    }

    /// Validate only the route path parameters
    #[must_use]
    pub fn params(schema: &'static Schema) -> Self {
        Self {
            spec: ValidationSpec::new().params(schema),
            single_source_body: false,
            on_error: None,
        }
    }

    /// Validate several sources at once
    ///
    /// Body validation is silently skipped for GET requests; the first
    /// failing source short-circuits the rest.
    #[must_use]
    pub fn new(spec: ValidationSpec) -> Self {
        Self {
            spec,
            single_source_body: false,
            on_error: None,
        }
    }

    /// Replace the standard 400 envelope with a custom responder
    #[must_use]
    pub fn on_error<F>(mut self, responder: F) -> Self
    where
        F: Fn(&[FieldError]) -> Response + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(responder));
        self
    }
}

impl<S> Layer<S> for ValidationLayer {
    type Service = ValidationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ValidationService {
            inner,
            spec: self.spec,
            single_source_body: self.single_source_body,
            on_error: self.on_error.clone(),
        }
    }
}

/// Middleware service applying schema validation
#[derive(Clone)]
pub struct ValidationService<S> {
    inner: S,
    spec: ValidationSpec,
    single_source_body: bool,
    on_error: Option<ErrorResponder>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for ValidationService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationService")
            .field("inner", &self.inner)
            .field("spec", &self.spec)
            .finish()
    }
}

impl<S> Service<Request> for ValidationService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let spec = self.spec;
        let single_source_body = self.single_source_body;
        let on_error = self.on_error.clone();
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let is_get = req.method() == Method::GET;

            if single_source_body && is_get {
                let errors = vec![FieldError {
                    path: "body".to_string(),
                    message: "body validation is not supported for GET requests".to_string(),
                }];
                return Ok(respond(on_error.as_ref(), &errors));
            }

            let (mut parts, body) = req.into_parts();
            let mut validated = ValidatedData::default();

            // Body: buffered, parsed, validated. Malformed JSON is not a
            // schema violation; it surfaces as the generic 500 envelope.
            let body = match (spec.body, is_get) {
                (Some(schema), false) => {
                    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
                        Ok(bytes) => bytes,
                        Err(e) => {
                            return Ok(ApiError::Internal(format!("failed to read body: {e}"))
                                .into_response());
                        },
                    };
                    let raw: Value = if bytes.is_empty() {
                        Value::Object(Map::new())
                    } else {
                        match serde_json::from_slice(&bytes) {
                            Ok(value) => value,
                            Err(e) => {
                                error!(
                                    path = %parts.uri.path(),
                                    method = %parts.method,
                                    error = %e,
                                    "Request body was not valid JSON"
                                );
                                return Ok(ApiError::Internal(format!(
                                    "malformed JSON body: {e}"
                                ))
                                .into_response());
                            },
                        }
                    };
                    match schema.validate(&raw, Coerce::Json) {
                        Ok(value) => validated.body = Some(value),
                        Err(errors) => return Ok(respond(on_error.as_ref(), &errors)),
                    }
                    Body::from(bytes)
                },
                _ => body,
            };

            if let Some(schema) = spec.query {
                let raw = query_to_value(parts.uri.query().unwrap_or(""));
                match schema.validate(&raw, Coerce::Strings) {
                    Ok(value) => validated.query = Some(value),
                    Err(errors) => return Ok(respond(on_error.as_ref(), &errors)),
                }
            }

            if let Some(schema) = spec.params {
                let raw = path_params_to_value(&mut parts).await;
                match schema.validate(&raw, Coerce::Strings) {
                    Ok(value) => validated.params = Some(value),
                    Err(errors) => return Ok(respond(on_error.as_ref(), &errors)),
                }
            }

            let mut req = Request::from_parts(parts, body);
            req.extensions_mut().insert(validated);
            inner.call(req).await
        })
    }
}

fn respond(on_error: Option<&ErrorResponder>, errors: &[FieldError]) -> Response {
    on_error.map_or_else(
        || ApiError::Validation(errors.to_vec()).into_response(),
        |responder| responder(errors),
    )
}

/// Flatten the query string into a string-valued JSON object
///
/// Duplicate keys keep the last occurrence.
fn query_to_value(query: &str) -> Value {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_default();
    let mut map = Map::new();
    for (key, value) in pairs {
        map.insert(key, Value::String(value));
    }
    Value::Object(map)
}

/// Collect route path parameters into a string-valued JSON object
async fn path_params_to_value(parts: &mut axum::http::request::Parts) -> Value {
    let mut map = Map::new();
    if let Ok(params) = RawPathParams::from_request_parts(parts, &()).await {
        for (key, value) in &params {
            map.insert(key.to_string(), Value::String(value.to_string()));
        }
    }
    Value::Object(map)
}
