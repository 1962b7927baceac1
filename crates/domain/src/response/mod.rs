//! Response types

mod spec;

pub use spec::{ApiErrorBody, ApiResponse};
