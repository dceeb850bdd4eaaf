// crates/harvest-rpc/src/server.rs
//
// RPC server setup: HarvestRpcServer and RpcConfig.
//
// Uses a JSON-RPC-over-gRPC approach. A single tonic unary service accepts
// JSON-encoded requests with a method field, dispatches to the matching
// handler, and returns JSON-encoded responses. HTTP/1 is accepted so the
// CLI can talk to it with a plain POST.

use std::sync::Arc;
use std::time::Instant;

use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, RwLock};
use tonic::transport::Server;
use tonic::Status;

use harvest_core::events::EventRecord;
use harvest_runtime::Platform;
use harvest_store::StateStore;

use crate::handlers;
use crate::middleware;

// ---------------------------------------------------------------------------
// RpcConfig
// ---------------------------------------------------------------------------

/// Configuration for the RPC server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    /// Host to bind to (e.g., "127.0.0.1" or "0.0.0.0").
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50061,
        }
    }
}

// ---------------------------------------------------------------------------
// JSON-RPC Envelope
// ---------------------------------------------------------------------------

/// A JSON-RPC-style request envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// The RPC method to invoke (e.g., "tx/submit", "lot/get").
    pub method: String,
    /// JSON-encoded parameters for the method.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// A JSON-RPC-style response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub success: bool,
    pub result: Option<serde_json::Value>,
    pub error: Option<String>,
}

impl JsonRpcResponse {
    fn from_result(result: Result<serde_json::Value, String>) -> Self {
        match result {
            Ok(value) => Self {
                success: true,
                result: Some(value),
                error: None,
            },
            Err(err) => Self {
                success: false,
                result: None,
                error: Some(err),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// HarvestRpcServer
// ---------------------------------------------------------------------------

/// The RPC server for a Harvest node.
///
/// Holds the shared platform, the store commits are persisted to, and an
/// optional broadcast sender for committed events.
#[derive(Clone)]
pub struct HarvestRpcServer {
    config: RpcConfig,
    platform: Arc<RwLock<Platform>>,
    store: Arc<dyn StateStore>,
    events_tx: Option<broadcast::Sender<EventRecord>>,
    start_time: Option<Instant>,
}

impl std::fmt::Debug for HarvestRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarvestRpcServer")
            .field("config", &self.config)
            .field("broadcast_enabled", &self.events_tx.is_some())
            .finish()
    }
}

impl HarvestRpcServer {
    pub fn new(config: RpcConfig, platform: Arc<RwLock<Platform>>, store: Arc<dyn StateStore>) -> Self {
        Self {
            config,
            platform,
            store,
            events_tx: None,
            start_time: None,
        }
    }

    /// Publish committed events on this channel.
    pub fn with_event_sender(mut self, tx: broadcast::Sender<EventRecord>) -> Self {
        self.events_tx = Some(tx);
        self
    }

    /// Set the daemon start time for uptime calculation.
    pub fn with_start_time(mut self, st: Instant) -> Self {
        self.start_time = Some(st);
        self
    }

    /// Bind to the configured address and serve until the process exits.
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let addr = format!("{}:{}", self.config.host, self.config.port).parse()?;

        tracing::info!("Harvest RPC server starting on {}", addr);

        Server::builder()
            .accept_http1(true)
            .add_service(tonic::service::interceptor::InterceptedService::new(
                HarvestJsonRpcServer::new(self.service()),
                middleware::logging_interceptor,
            ))
            .serve(addr)
            .await?;

        Ok(())
    }

    /// Dispatch one envelope without going through the transport.
    pub async fn handle(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        self.service().dispatch(request).await
    }

    fn service(&self) -> HarvestServiceImpl {
        HarvestServiceImpl {
            platform: self.platform.clone(),
            store: self.store.clone(),
            events_tx: self.events_tx.clone(),
            start_time: self.start_time,
        }
    }
}

// ---------------------------------------------------------------------------
// gRPC Service Definition (manual, no proto codegen)
// ---------------------------------------------------------------------------

/// Shared state behind the service, dispatching JSON-RPC calls by method.
#[derive(Clone)]
struct HarvestServiceImpl {
    platform: Arc<RwLock<Platform>>,
    store: Arc<dyn StateStore>,
    events_tx: Option<broadcast::Sender<EventRecord>>,
    start_time: Option<Instant>,
}

impl HarvestServiceImpl {
    async fn dispatch(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        use handlers::{node, query, tx};

        let platform = self.platform.as_ref();
        let store = self.store.as_ref();
        let params = request.params;

        let result = match request.method.as_str() {
            // Transactions
            "tx/submit" => {
                let events_tx = self.events_tx.as_ref();
                dispatch_handler(params, |r| tx::handle_submit_tx(platform, store, events_tx, r)).await
            }

            // Accounts
            "account/get" => dispatch_handler(params, |r| query::handle_get_account(platform, r)).await,
            "account/nonce" => dispatch_handler(params, |r| query::handle_get_nonce(platform, r)).await,

            // Lots and certification
            "lot/get" => dispatch_handler(params, |r| query::handle_get_lot(platform, r)).await,
            "lot/balance" => {
                dispatch_handler(params, |r| query::handle_get_lot_balance(platform, r)).await
            }
            "lot/metadata" => {
                dispatch_handler(params, |r| query::handle_get_lot_metadata(platform, r)).await
            }
            "certification/get" => {
                dispatch_handler(params, |r| query::handle_get_certification(platform, r)).await
            }
            "protocol/requested" => {
                dispatch_handler(params, |r| query::handle_get_requested_protocols(platform, r)).await
            }

            // Governance
            "governance/proposal" => {
                dispatch_handler(params, |r| query::handle_get_proposal(platform, r)).await
            }
            "governance/proposals" => {
                dispatch_handler(params, |r| query::handle_list_proposals(platform, r)).await
            }
            "governance/member" => {
                dispatch_handler(params, |r| query::handle_get_member(platform, r)).await
            }
            "governance/credited" => {
                dispatch_handler(params, |r| query::handle_get_credited(platform, r)).await
            }
            "governance/guarantee" => {
                dispatch_handler(params, |r| query::handle_get_guarantee(platform, r)).await
            }

            // Settlement token
            "token/balance" => {
                dispatch_handler(params, |r| query::handle_get_token_balance(platform, r)).await
            }
            "token/allowance" => {
                dispatch_handler(params, |r| query::handle_get_allowance(platform, r)).await
            }

            // Event log
            "events/since" => dispatch_handler(params, |r| query::handle_events_since(store, r)).await,

            // Node
            "node/health" => {
                dispatch_handler(params, |r| node::handle_get_health(platform, store, r)).await
            }
            "node/info" => {
                let start_time = self.start_time;
                dispatch_handler(params, |r| node::handle_get_node_info(platform, start_time, r)).await
            }

            _ => Err(format!("Unknown method: {}", request.method)),
        };

        if let Err(e) = &result {
            tracing::debug!(method = %request.method, "RPC call failed: {}", e);
        }
        JsonRpcResponse::from_result(result)
    }
}

/// Deserialize params into a request type, call the handler, and serialize
/// the result to JSON. Missing params are treated as an empty object.
async fn dispatch_handler<Req, Resp, F, Fut>(
    params: serde_json::Value,
    handler: F,
) -> Result<serde_json::Value, String>
where
    Req: serde::de::DeserializeOwned,
    Resp: serde::Serialize,
    F: FnOnce(Req) -> Fut,
    Fut: std::future::Future<Output = Result<Resp, String>>,
{
    let params = if params.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        params
    };
    let request: Req = serde_json::from_value(params)
        .map_err(|e| format!("Failed to deserialize request: {}", e))?;
    let response = handler(request).await?;
    serde_json::to_value(response).map_err(|e| format!("Failed to serialize response: {}", e))
}

// ---------------------------------------------------------------------------
// Tonic Service Wiring
// ---------------------------------------------------------------------------
// One service, one implicit method. Request and response bodies are raw
// JSON bytes (JsonRpcRequest / JsonRpcResponse).

#[derive(Clone)]
pub struct HarvestJsonRpcServer {
    inner: HarvestServiceImpl,
}

impl std::fmt::Debug for HarvestJsonRpcServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HarvestJsonRpcServer").finish()
    }
}

impl HarvestJsonRpcServer {
    fn new(inner: HarvestServiceImpl) -> Self {
        Self { inner }
    }
}

impl tonic::server::NamedService for HarvestJsonRpcServer {
    const NAME: &'static str = "harvest.rpc.HarvestService";
}

impl<B> tower_service::Service<http::Request<B>> for HarvestJsonRpcServer
where
    B: HttpBody + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    B::Data: Send,
{
    type Response = http::Response<tonic::body::BoxBody>;
    type Error = std::convert::Infallible;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        let inner = self.inner.clone();

        Box::pin(async move {
            let body_bytes = match collect_body(req.into_body()).await {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!("Failed to read request body: {}", e);
                    let resp = JsonRpcResponse::from_result(Err(format!(
                        "Failed to read request body: {}",
                        e
                    )));
                    return Ok(build_response(&resp));
                }
            };

            let rpc_request: JsonRpcRequest = match serde_json::from_slice(&body_bytes) {
                Ok(r) => r,
                Err(e) => {
                    let resp =
                        JsonRpcResponse::from_result(Err(format!("Invalid JSON-RPC request: {}", e)));
                    return Ok(build_response(&resp));
                }
            };

            let rpc_response = inner.dispatch(rpc_request).await;
            Ok(build_response(&rpc_response))
        })
    }
}

/// Collect the body of an HTTP request into bytes.
async fn collect_body<B>(body: B) -> Result<Vec<u8>, String>
where
    B: HttpBody + Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    B::Data: Send,
{
    let mut collected = Vec::new();
    let mut body = std::pin::pin!(body);

    loop {
        match std::future::poll_fn(|cx| HttpBody::poll_frame(body.as_mut(), cx)).await {
            Some(Ok(frame)) => {
                if let Ok(data) = frame.into_data() {
                    use bytes::Buf;
                    collected.extend_from_slice(data.chunk());
                }
            }
            Some(Err(e)) => return Err(e.into().to_string()),
            None => break,
        }
    }

    Ok(collected)
}

/// Build a 200 response carrying the JSON envelope.
fn build_response(resp: &JsonRpcResponse) -> http::Response<tonic::body::BoxBody> {
    let json = serde_json::to_vec(resp).unwrap_or_default();
    let body = tonic::body::BoxBody::new(
        http_body_util::Full::new(bytes::Bytes::from(json))
            .map_err(|e| Status::internal(format!("body error: {}", e))),
    );

    let mut response = http::Response::new(body);
    response.headers_mut().insert(
        http::header::CONTENT_TYPE,
        http::HeaderValue::from_static("application/json"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    use harvest_core::clock::ManualClock;
    use harvest_core::crypto::Keypair;
    use harvest_core::transaction::{Call, Transaction};
    use harvest_core::{Address, Role};
    use harvest_runtime::GenesisConfig;
    use harvest_store::MemoryStore;
    use serde_json::json;

    fn server() -> HarvestRpcServer {
        let mut genesis = GenesisConfig::new(Address([3u8; 20]));
        genesis.settlement_supply = 1000;
        let clock = Arc::new(ManualClock::new(chrono::Utc::now()));
        let platform = Platform::new(&genesis, clock).unwrap();
        HarvestRpcServer::new(
            RpcConfig::default(),
            Arc::new(RwLock::new(platform)),
            Arc::new(MemoryStore::new()),
        )
    }

    fn call(method: &str, params: serde_json::Value) -> JsonRpcRequest {
        JsonRpcRequest {
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let resp = server().handle(call("lot/transfer", json!({}))).await;
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("Unknown method: lot/transfer"));
    }

    #[tokio::test]
    async fn test_bad_params_reported() {
        let resp = server()
            .handle(call("token/balance", json!({ "account": "not-an-address" })))
            .await;
        assert!(!resp.success);
        assert!(resp.error.unwrap().starts_with("Failed to deserialize request"));
    }

    #[tokio::test]
    async fn test_null_params_for_parameterless_methods() {
        let resp = server().handle(call("node/info", serde_json::Value::Null)).await;
        assert!(resp.success, "{:?}", resp.error);
        assert_eq!(resp.result.unwrap()["height"], 0);
    }

    #[tokio::test]
    async fn test_submit_then_query_and_replay_events() {
        let server = server();
        let (events_tx, mut events_rx) = broadcast::channel(16);
        let server = server.with_event_sender(events_tx);
        let producer = Keypair::generate();

        let tx = Transaction::sign(
            &producer,
            0,
            Call::Register {
                username: "carol".to_string(),
                email: "carol@farm.example".to_string(),
                role: Role::Producer,
            },
        )
        .unwrap();
        let resp = server
            .handle(call("tx/submit", json!({ "transaction": tx })))
            .await;
        assert!(resp.success, "{:?}", resp.error);
        assert_eq!(resp.result.unwrap()["receipt"]["height"], 1);
        assert_eq!(events_rx.recv().await.unwrap().height, 1);

        let nonce = server
            .handle(call("account/nonce", json!({ "account": producer.address() })))
            .await;
        assert_eq!(nonce.result.unwrap()["next_nonce"], 1);

        let events = server
            .handle(call("events/since", json!({ "height": 0 })))
            .await;
        let result = events.result.unwrap();
        assert_eq!(result["events"].as_array().unwrap().len(), 1);
        assert_eq!(result["last_height"], 1);

        let health = server.handle(call("node/health", json!({}))).await;
        assert_eq!(health.result.unwrap()["status"], "healthy");
    }
}
