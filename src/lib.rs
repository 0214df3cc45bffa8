//! Filechan client library
//!
//! Client-side protocol engine for channel-based file distribution
//! through a TCP rendezvous server: wire framing, subscribe/unsubscribe
//! lifecycle, and streamed file transfer.

pub mod config;
pub mod error;
pub mod logger;
pub mod net;
pub mod protocol;
pub mod send;
pub mod subscribe;
pub mod transfer;
