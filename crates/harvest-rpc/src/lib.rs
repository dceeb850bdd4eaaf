// crates/harvest-rpc/src/lib.rs
//
// harvest-rpc: gRPC/JSON-RPC server and handlers for the Harvest Protocol.
//
// A single tonic service accepts JSON-encoded `{ method, params }`
// envelopes over HTTP/1 or HTTP/2, dispatches them to the handlers in
// `handlers/`, and answers with `{ success, result, error }`.

pub mod handlers;
pub mod middleware;
pub mod server;

pub use server::{HarvestRpcServer, JsonRpcRequest, JsonRpcResponse, RpcConfig};
