pub mod endpoints;
pub mod error;
pub mod webhook;

pub use endpoints::Endpoints;
pub use error::{DispatchError, Result};
pub use webhook::{DispatchSettings, WebhookDispatcher};
