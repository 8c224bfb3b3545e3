//! Base types and error handling.
//!
//! Provides foundational types mirroring Chromium's `net/base/`:
//! - [`NetError`](neterror::NetError): Network error codes matching `net_error_list.h`
//! - [`ConnectState`](connectstate::ConnectState): Session connection states

pub mod connectstate;
pub mod context;
pub mod neterror;
