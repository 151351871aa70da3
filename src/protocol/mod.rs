//! Wire protocol shared by the server and the terminal client.

mod messages;

pub use messages::*;
