//! Chat service REST adapter for roster reads and direct messages.

mod dto;
mod http_client;

pub use http_client::HipChatHttpClient;
