//! gitlane services
//!
//! Each service implements the `Service` trait and handles a namespace of
//! JSON-RPC methods. `ParseService` is the only one today: it exposes every
//! parser of `gitlane-core` under `parse/*`.

pub mod parse;

pub use parse::ParseService;

use gitlane_protocol::HandlerResult;

/// Trait implemented by all services.
///
/// Each service handles a namespace of methods (e.g. "parse/*").
pub trait Service: Send + Sync {
    /// The namespace prefix this service handles (e.g. "parse").
    fn namespace(&self) -> &str;

    /// Handle a JSON-RPC request within this service's namespace.
    ///
    /// `method` is the full method string (e.g. "parse/status").
    /// `params` is the optional JSON parameters.
    fn handle(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> impl std::future::Future<Output = HandlerResult> + Send;

    /// Whether `method` belongs to this service's namespace.
    fn owns(&self, method: &str) -> bool {
        method
            .split_once('/')
            .is_some_and(|(ns, _)| ns == self.namespace())
    }
}
