//! Terminal client for the quiz service.
//!
//! Talks to the server over WebSocket. Screen state lives in
//! [`ClientApp`](state::ClientApp); key presses and server responses both
//! mutate it, and the render loop draws whatever it holds.

mod client;
mod forms;
mod input;
mod quiz_run;
mod state;
mod ui;

pub use client::run;
