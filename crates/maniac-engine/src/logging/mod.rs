//! Logger initialization.
//!
//! Everything in the workspace logs through the `log` facade; the binary calls
//! [`init_logging`] once, early in `main`.

mod init;

pub use init::{init_logging, LoggingConfig};
