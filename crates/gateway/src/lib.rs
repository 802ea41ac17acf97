#![forbid(unsafe_code)]

pub mod contract;
pub mod http;

pub use contract::{GatewayError, InMemoryGateway, Submission, TestGateway};
pub use http::HttpGateway;
