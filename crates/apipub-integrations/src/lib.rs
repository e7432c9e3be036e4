//! Handlers invoked by the routes of the provisioned API.
//!
//! Each handler takes the proxy [`RequestEnvelope`] and answers with a
//! [`ResponseEnvelope`] whose body is pretty-printed JSON.

mod envelope;
mod handlers;

pub use envelope::{RequestEnvelope, ResponseEnvelope};
pub use handlers::{GREETING_PARAMETER, greeting, ping};
