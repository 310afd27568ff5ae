//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, locations → project scope)
//!     → request.rs (request ID)
//!     → dispatch.rs (params, resolve, invoke, delay)
//!     → response.rs (envelope, pretty JSON)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod params;
pub mod request;
pub mod response;
pub mod server;

pub use dispatch::{DispatchOptions, DispatchRequest, RequestDispatcher};
pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
