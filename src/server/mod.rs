/// HTTP transport: routes, handlers and error mapping
/// Clean separation of transport layer
pub mod error;
pub mod http;

// Re-export for convenience
pub use error::{ApiError, ErrorBody};
pub use http::{api_routes, AppState, HttpServer};
