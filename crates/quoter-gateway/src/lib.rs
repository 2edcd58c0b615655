//! Exchange gateway capability for the quoting bot.
//!
//! The gateway is a stateless request/response adapter to the venue:
//! - `ExchangeGateway`: the trait consumed by engine and recorder
//! - `RestGateway`: signed HTTP implementation
//! - `MockGateway`: scripted implementation for tests (feature `mock`)

pub mod error;
pub mod gateway;
pub mod rest;
pub mod types;

pub use error::{GatewayError, GatewayResult};
pub use gateway::{BoxFuture, ExchangeGateway};
#[cfg(any(test, feature = "mock"))]
pub use gateway::MockGateway;
pub use rest::{Credentials, RestGateway};
pub use types::{CancelOutcome, NewOrderRequest, OrderAck, OrderDetail};
