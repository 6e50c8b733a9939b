#![forbid(unsafe_code)]

pub mod api;
pub mod http;
pub mod memory;

pub use api::{ClientError, TestBackend};
pub use http::{ClientConfig, HttpBackend};
pub use memory::{InMemoryBackend, SubmittedAnswer};
