//! gitlane protocol types
//!
//! JSON-RPC 2.0 compatible types for the gitlane parse service.
//! This crate is the single source of truth for the envelope types,
//! method names and error codes shared by the service and its callers.

pub mod error;
pub mod jsonrpc;
pub mod methods;

pub use error::{RpcError, RpcErrorCode};
pub use jsonrpc::{
    HandlerResult, RequestId, RpcErrorResponse, RpcRequest, RpcResponse, RpcSuccessResponse,
};
pub use methods::{MethodName, Methods};
