#![warn(rust_2018_idioms)]
//! STUN (RFC 5389) message codec with the TURN and ICE attribute
//! extensions, a transaction agent, and an async client.
//!
//! Messages keep one canonical byte buffer; attribute descriptors address
//! slices of it, which keeps encode and decode hot paths free of per-call
//! allocation. The agent correlates responses to in-flight requests by
//! 96-bit transaction ID and delivers exactly one completion event per
//! transaction; the client couples an agent with a `util::Conn` transport.

#[macro_use]
extern crate lazy_static;

pub mod addr;
pub mod agent;
pub mod attributes;
pub mod checks;
pub mod client;
mod error;
pub mod error_code;
pub mod fingerprint;
pub mod iceattrs;
pub mod integrity;
pub mod message;
pub mod natattrs;
pub mod textattrs;
pub mod turnattrs;
pub mod uattrs;
pub mod uri;
pub mod xoraddr;

pub use error::{Error, Result};
