//! Request handlers.

mod http;
mod websocket;

pub use http::{get_snapshot, get_snapshots, health_check, post_chat_event};
pub use websocket::websocket_handler;
