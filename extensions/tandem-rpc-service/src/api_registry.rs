use std::any::type_name;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api_error::ApiError;
use crate::serializer::Serializer;

/// Future returned by an API invoker. Resolves to the encoded reply body,
/// `None` for one-way APIs that emit no reply.
pub type ApiFuture = Pin<Box<dyn Future<Output = Result<Option<Vec<u8>>, ApiError>> + Send>>;

/// Type-erased handler invoker: raw request body in, encoded reply body
/// out. Argument decoding and result encoding happen inside, against the
/// serializer and types captured at registration.
pub type ApiInvoker = Arc<dyn Fn(Vec<u8>) -> ApiFuture + Send + Sync>;

/// One registered API: its match key, the shape captured at registration,
/// and the invoker that runs the handler.
#[derive(Clone)]
pub struct ApiDescriptor {
    name: String,
    parameter_types: &'static str,
    return_type: Option<&'static str>,
    invoke: ApiInvoker,
}

impl ApiDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered parameter tuple the handler decodes its arguments into,
    /// as captured at registration.
    pub fn parameter_types(&self) -> &'static str {
        self.parameter_types
    }

    /// Declared result type, `None` for one-way APIs.
    pub fn return_type(&self) -> Option<&'static str> {
        self.return_type
    }

    /// Whether a reply frame is emitted for this API.
    pub fn returns_reply(&self) -> bool {
        self.return_type.is_some()
    }

    /// Decodes `body` into the handler's arguments, runs the handler, and
    /// encodes its result. All of that happens inside the returned future,
    /// so the caller can move it onto a worker before any work is done.
    pub fn invoke(&self, body: Vec<u8>) -> ApiFuture {
        (self.invoke)(body)
    }
}

impl std::fmt::Debug for ApiDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiDescriptor")
            .field("name", &self.name)
            .field("parameter_types", &self.parameter_types)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

/// Collects API registrations before an endpoint starts accepting packets.
///
/// Handlers are plain async closures over a deserializable argument tuple.
/// The builder captures the endpoint's serializer so each registration can
/// bake argument decoding and result encoding into its invoker; once
/// [`build`](Self::build) runs, the resulting registry is immutable.
pub struct ApiRegistryBuilder<S: Serializer> {
    serializer: Arc<S>,
    apis: HashMap<String, ApiDescriptor>,
}

impl<S: Serializer> Clone for ApiRegistryBuilder<S> {
    fn clone(&self) -> Self {
        Self {
            serializer: Arc::clone(&self.serializer),
            apis: self.apis.clone(),
        }
    }
}

impl<S: Serializer> ApiRegistryBuilder<S> {
    pub fn new(serializer: Arc<S>) -> Self {
        Self {
            serializer,
            apis: HashMap::new(),
        }
    }

    /// Registers an API that replies with the handler's return value.
    ///
    /// `Args` is the ordered argument tuple decoded from the request body,
    /// e.g. `(String,)` for a single string parameter. Registering a name
    /// twice replaces the earlier handler.
    pub fn register<Args, Ret, F, Fut>(mut self, name: &str, handler: F) -> Self
    where
        Args: DeserializeOwned + Send + 'static,
        Ret: Serialize + Send + 'static,
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Ret, ApiError>> + Send + 'static,
    {
        let serializer = Arc::clone(&self.serializer);
        let handler = Arc::new(handler);
        let invoke: ApiInvoker = Arc::new(move |body: Vec<u8>| {
            let serializer = Arc::clone(&serializer);
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let args: Args = serializer.decode(&body).map_err(ApiError::from)?;
                let value = handler(args).await?;
                let reply = serializer.encode(&value).map_err(ApiError::from)?;
                Ok(Some(reply))
            }) as ApiFuture
        });

        self.insert(ApiDescriptor {
            name: name.to_string(),
            parameter_types: type_name::<Args>(),
            return_type: Some(type_name::<Ret>()),
            invoke,
        });
        self
    }

    /// Registers an API with no result: the peer gets no reply frame, so
    /// callers should reach it through one-way invocation.
    pub fn register_one_way<Args, F, Fut>(mut self, name: &str, handler: F) -> Self
    where
        Args: DeserializeOwned + Send + 'static,
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        let serializer = Arc::clone(&self.serializer);
        let handler = Arc::new(handler);
        let invoke: ApiInvoker = Arc::new(move |body: Vec<u8>| {
            let serializer = Arc::clone(&serializer);
            let handler = Arc::clone(&handler);
            Box::pin(async move {
                let args: Args = serializer.decode(&body).map_err(ApiError::from)?;
                handler(args).await?;
                Ok(None)
            }) as ApiFuture
        });

        self.insert(ApiDescriptor {
            name: name.to_string(),
            parameter_types: type_name::<Args>(),
            return_type: None,
            invoke,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.apis.is_empty()
    }

    /// Freezes the registrations. No APIs can be added afterwards.
    pub fn build(self) -> ApiRegistry {
        ApiRegistry { apis: self.apis }
    }

    fn insert(&mut self, descriptor: ApiDescriptor) {
        let name = descriptor.name.clone();
        if self.apis.insert(name.clone(), descriptor).is_some() {
            tracing::warn!(api_name = %name, "replacing an already registered API");
        }
    }
}

/// Immutable name → descriptor map, built once before the endpoint starts
/// accepting packets. Lookups are case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct ApiRegistry {
    apis: HashMap<String, ApiDescriptor>,
}

impl ApiRegistry {
    /// A registry serving no APIs, for endpoints that only ever call out.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn try_get(&self, name: &str) -> Option<&ApiDescriptor> {
        self.apis.get(name)
    }

    pub fn len(&self) -> usize {
        self.apis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apis.is_empty()
    }
}
