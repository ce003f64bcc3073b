//! Process-wide logging setup shared by the job board binaries.

pub mod subscriber;

pub use subscriber::{init, init_with, LogFormat, UnknownLogFormat};
