//! Core building blocks: error taxonomy, cancellation, request pacing.

pub mod cancel;
pub mod error;
pub mod pacer;

pub use cancel::CancelToken;
pub use error::{MirrorError, MirrorResult};
pub use pacer::Pacer;
