//! Quiz service.
//!
//! Clients connect over WebSocket and exchange JSON [`Request`]/[`Response`]
//! messages. Every request runs in its own task, so a slow generation call
//! never blocks other requests on the same connection.
//!
//! [`Request`]: crate::protocol::Request
//! [`Response`]: crate::protocol::Response

mod handlers;
mod server;
mod state;

pub use handlers::dispatch;
pub use server::{run, serve};
pub use state::AppState;
