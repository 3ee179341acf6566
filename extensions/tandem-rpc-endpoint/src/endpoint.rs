use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use tandem::packet::{Packet, PacketCodec, PacketStreamDecoder};
use tandem::utils::PacketIdSource;
use tandem_rpc_service::{
    ApiError, ApiRegistry, ApiRegistryBuilder, JsonSerializer, Serializer,
};

use crate::config::EndpointConfig;
use crate::dispatcher;
use crate::error::{EndpointError, InvokeError};
use crate::pending_call::{CallOutcome, PendingCallTable};

/// Which side of the connection this endpoint is. The role is stamped into
/// every request packet's direction flag, which is how each peer tells
/// replies to its own calls apart from fresh requests on a fully symmetric
/// connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointRole {
    Client,
    Server,
}

impl EndpointRole {
    pub fn is_client(self) -> bool {
        matches!(self, EndpointRole::Client)
    }
}

/// Hook invoked when serving the peer raises an error (unknown API name or
/// a failed handler). Returning `true` marks the error handled; unhandled
/// errors are logged and the connection continues either way.
pub type ExceptionHook = Arc<dyn Fn(&Packet, &EndpointError) -> bool + Send + Sync>;

/// Assembles an [`RpcEndpoint`]: serializer, config, API registrations, and
/// the exception hook. Registration is frozen once `build` runs; the
/// endpoint never accepts packets before that.
pub struct RpcEndpointBuilder<S: Serializer = JsonSerializer> {
    config: EndpointConfig,
    serializer: Arc<S>,
    registry: ApiRegistryBuilder<S>,
    exception_hook: Option<ExceptionHook>,
}

impl RpcEndpointBuilder<JsonSerializer> {
    pub fn new() -> Self {
        Self::with_serializer(JsonSerializer)
    }
}

impl Default for RpcEndpointBuilder<JsonSerializer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Serializer> Clone for RpcEndpointBuilder<S> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            serializer: Arc::clone(&self.serializer),
            registry: self.registry.clone(),
            exception_hook: self.exception_hook.clone(),
        }
    }
}

impl<S: Serializer> RpcEndpointBuilder<S> {
    /// Starts a builder around a non-default body codec. Both peers of a
    /// connection must agree on it.
    pub fn with_serializer(serializer: S) -> Self {
        let serializer = Arc::new(serializer);
        Self {
            config: EndpointConfig::default(),
            registry: ApiRegistryBuilder::new(Arc::clone(&serializer)),
            serializer,
            exception_hook: None,
        }
    }

    pub fn config(mut self, config: EndpointConfig) -> Self {
        self.config = config;
        self
    }

    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.config.call_timeout = timeout;
        self
    }

    pub fn max_frame_bytes(mut self, max_frame_bytes: u32) -> Self {
        self.config.max_frame_bytes = max_frame_bytes;
        self
    }

    /// Registers an API the peer can invoke; the handler's return value is
    /// sent back as the reply.
    pub fn register<Args, Ret, F, Fut>(mut self, name: &str, handler: F) -> Self
    where
        Args: DeserializeOwned + Send + 'static,
        Ret: Serialize + Send + 'static,
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Ret, ApiError>> + Send + 'static,
    {
        self.registry = self.registry.register(name, handler);
        self
    }

    /// Registers an API that emits no reply.
    pub fn register_one_way<Args, F, Fut>(mut self, name: &str, handler: F) -> Self
    where
        Args: DeserializeOwned + Send + 'static,
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ApiError>> + Send + 'static,
    {
        self.registry = self.registry.register_one_way(name, handler);
        self
    }

    pub fn exception_hook<H>(mut self, hook: H) -> Self
    where
        H: Fn(&Packet, &EndpointError) -> bool + Send + Sync + 'static,
    {
        self.exception_hook = Some(Arc::new(hook));
        self
    }

    /// Finalizes the endpoint. `outbound` is where encoded frames go; the
    /// transport drains it into the socket from a single writer task so
    /// concurrent calls never interleave on the wire.
    ///
    /// Must run inside a Tokio runtime: the deadline sweeper is spawned
    /// here.
    pub fn build(self, role: EndpointRole, outbound: UnboundedSender<Vec<u8>>) -> RpcEndpoint<S> {
        let decoder = PacketStreamDecoder::with_max_frame_bytes(self.config.max_frame_bytes);
        let shared = Arc::new(EndpointShared {
            role,
            config: self.config,
            serializer: self.serializer,
            registry: self.registry.build(),
            ids: PacketIdSource::new(),
            pending: PendingCallTable::new(),
            decoder: Mutex::new(decoder),
            outbound: Mutex::new(Some(outbound)),
            connected: AtomicBool::new(true),
            exception_hook: self.exception_hook,
            sweeper: Mutex::new(None),
        });

        let sweeper = tokio::spawn(sweep_expired_calls(Arc::downgrade(&shared)));
        *shared
            .sweeper
            .lock()
            .expect("sweeper handle mutex poisoned") = Some(sweeper);

        RpcEndpoint { shared }
    }
}

/// State owned by the endpoint and borrowed by the dispatcher during
/// packet handling.
pub(crate) struct EndpointShared<S: Serializer> {
    pub(crate) role: EndpointRole,
    pub(crate) config: EndpointConfig,
    pub(crate) serializer: Arc<S>,
    pub(crate) registry: ApiRegistry,
    pub(crate) ids: PacketIdSource,
    pub(crate) pending: PendingCallTable,
    pub(crate) decoder: Mutex<PacketStreamDecoder>,
    /// Dropped on disconnect so the transport's writer task sees its queue
    /// close and can shut the socket down.
    pub(crate) outbound: Mutex<Option<UnboundedSender<Vec<u8>>>>,
    pub(crate) connected: AtomicBool,
    pub(crate) exception_hook: Option<ExceptionHook>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl<S: Serializer> EndpointShared<S> {
    pub(crate) fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Frames and queues a packet for the transport's writer task.
    pub(crate) fn send_packet(&self, packet: &Packet) -> Result<(), InvokeError> {
        let bytes = PacketCodec::encode(packet)?;
        match self
            .outbound
            .lock()
            .expect("outbound sender mutex poisoned")
            .as_ref()
        {
            Some(outbound) => outbound.send(bytes).map_err(|_| InvokeError::Disconnected),
            None => Err(InvokeError::Disconnected),
        }
    }
}

/// One peer of a tandem connection.
///
/// Cloning is cheap and yields another handle onto the same session; the
/// transport typically keeps one clone for its read loop while application
/// code invokes through another.
pub struct RpcEndpoint<S: Serializer = JsonSerializer> {
    shared: Arc<EndpointShared<S>>,
}

impl<S: Serializer> Clone for RpcEndpoint<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl RpcEndpoint<JsonSerializer> {
    pub fn builder() -> RpcEndpointBuilder<JsonSerializer> {
        RpcEndpointBuilder::new()
    }
}

impl<S: Serializer> RpcEndpoint<S> {
    /// Calls `api_name` on the peer and awaits its reply, decoded as `Ret`.
    ///
    /// `args` is the ordered argument tuple, e.g. `("hi",)`. The call fails
    /// with [`InvokeError::Remote`] on an exception reply,
    /// [`InvokeError::TimedOut`] when the per-call deadline elapses, and
    /// [`InvokeError::Shutdown`] when the connection drops first. On a
    /// disconnected endpoint it fails before sending anything.
    pub async fn invoke<Args, Ret>(&self, api_name: &str, args: Args) -> Result<Ret, InvokeError>
    where
        Args: Serialize,
        Ret: DeserializeOwned,
    {
        if !self.shared.is_connected() {
            return Err(InvokeError::Disconnected);
        }

        let body = self.shared.serializer.encode(&args)?;
        let packet_id = self.shared.ids.next();
        let deadline = Instant::now() + self.shared.config.call_timeout;

        // Park before sending: on a fast connection the reply can be routed
        // before this task ever gets scheduled again.
        let completion = self.shared.pending.park(packet_id, deadline)?;

        let request = Packet::request(api_name, packet_id, self.shared.role.is_client(), body);
        if let Err(err) = self.shared.send_packet(&request) {
            self.shared.pending.discard(packet_id);
            return Err(err);
        }

        match completion.await {
            Ok(CallOutcome::Value(bytes)) => Ok(self.shared.serializer.decode(&bytes)?),
            Ok(CallOutcome::RemoteError(message)) => Err(InvokeError::Remote(message)),
            Ok(CallOutcome::TimedOut) => Err(InvokeError::TimedOut),
            Ok(CallOutcome::Shutdown) | Err(_) => Err(InvokeError::Shutdown),
        }
    }

    /// Sends a request without parking a pending call: no reply is expected
    /// and none will be delivered. Completes once the frame is queued for
    /// the connection's writer.
    pub async fn invoke_one_way<Args>(&self, api_name: &str, args: Args) -> Result<(), InvokeError>
    where
        Args: Serialize,
    {
        if !self.shared.is_connected() {
            return Err(InvokeError::Disconnected);
        }

        let body = self.shared.serializer.encode(&args)?;
        let packet_id = self.shared.ids.next();
        let request = Packet::request(api_name, packet_id, self.shared.role.is_client(), body);
        self.shared.send_packet(&request)
    }

    /// Feeds inbound transport bytes through the decoder and routes every
    /// complete packet, in arrival order.
    ///
    /// A [`ProtocolError`](tandem::packet::ProtocolError) tears the session
    /// down before it is returned: the caller only has to close the socket.
    pub fn on_receive(&self, bytes: &[u8]) -> Result<(), EndpointError> {
        let mut decoder = self.shared.decoder.lock().expect("decoder mutex poisoned");
        decoder.append(bytes);
        loop {
            match decoder.next_packet() {
                Ok(Some(packet)) => dispatcher::route_packet(&self.shared, packet),
                Ok(None) => return Ok(()),
                Err(err) => {
                    drop(decoder);
                    tracing::error!(error = %err, "protocol violation on inbound stream");
                    self.on_disconnect();
                    return Err(EndpointError::Protocol(err));
                }
            }
        }
    }

    /// Marks the connection down and fails every pending call with
    /// [`InvokeError::Shutdown`]. Idempotent; the transport calls this when
    /// the socket drops and the endpoint calls it itself on a protocol
    /// violation.
    pub fn on_disconnect(&self) {
        if !self.shared.connected.swap(false, Ordering::SeqCst) {
            return;
        }

        if let Some(sweeper) = self
            .shared
            .sweeper
            .lock()
            .expect("sweeper handle mutex poisoned")
            .take()
        {
            sweeper.abort();
        }

        // Closing the outbound queue is what lets the transport's writer
        // task drain and release the socket.
        drop(
            self.shared
                .outbound
                .lock()
                .expect("outbound sender mutex poisoned")
                .take(),
        );

        let orphaned = self.shared.pending.take_all();
        if !orphaned.is_empty() {
            tracing::debug!(count = orphaned.len(), "failing pending calls on shutdown");
        }
        for call in orphaned {
            call.resolve(CallOutcome::Shutdown);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.shared.is_connected()
    }

    /// Number of calls sent and not yet resolved.
    pub fn pending_calls(&self) -> usize {
        self.shared.pending.len()
    }

    pub fn role(&self) -> EndpointRole {
        self.shared.role
    }
}

/// Background sweep resolving calls whose deadline has passed. Holds only a
/// weak handle so a dropped endpoint ends the task on its next tick.
async fn sweep_expired_calls<S: Serializer>(shared: Weak<EndpointShared<S>>) {
    let interval = match shared.upgrade() {
        Some(shared) => shared.config.sweep_interval(),
        None => return,
    };
    let mut ticker = tokio::time::interval(interval);

    loop {
        ticker.tick().await;
        let Some(shared) = shared.upgrade() else {
            return;
        };
        for call in shared.pending.take_expired(Instant::now()) {
            tracing::debug!(
                packet_id = call.packet_id(),
                waited_ms = call.issued_at().elapsed().as_millis() as u64,
                "pending call deadline elapsed"
            );
            call.resolve(CallOutcome::TimedOut);
        }
    }
}
