//! Request middleware.

pub mod errors;

pub use errors::{panic_layer, report_errors, PanicReporter};
