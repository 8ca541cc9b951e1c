//! Model Context Protocol surface: JSON-RPC types, the tool catalogue, and
//! the HTTP handler that dispatches `initialize`, `tools/list` and `tools/call`.

pub mod protocol;
pub mod server;
pub mod tools;
