// crates/harvest-rpc/src/handlers/mod.rs
//
// Handler modules for all RPC endpoints. Each module defines request and
// response types plus the handler functions for one API group.

pub mod node;
pub mod query;
pub mod tx;
