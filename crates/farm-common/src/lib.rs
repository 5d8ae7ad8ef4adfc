pub mod error;
pub mod extract;
pub mod guide;
pub mod language;
pub mod mcp_api;
pub mod model;
pub mod openai;
pub mod weather;
