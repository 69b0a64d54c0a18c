//! Data Transfer Objects (DTOs) for the overlay.
//!
//! DTOs are organized by protocol:
//! - `websocket`: outbound WebSocket frame DTOs
//! - `http`: HTTP API request/response DTOs

pub mod http;
pub mod websocket;
