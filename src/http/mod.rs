//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → handler: views / health / simulation / kill switch
//!     → response.rs (error mapping)
//!     → middleware/errors.rs (verbose or generic fault reporting)
//!     → Send to client
//! ```

pub mod middleware;
pub mod response;
pub mod server;

pub use response::AppError;
pub use server::{build_router, AppState, HttpServer};
