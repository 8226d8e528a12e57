#![deny(clippy::expect_used, clippy::unwrap_used)]

//! The root of the AGPS data connection arbitration library.
//! AGPS 数据连接仲裁库的根。

pub mod agps;
pub mod config;
pub mod error;
pub mod service;

pub use agps::ConnectionManager;
pub use config::Config;
pub use error::{Error, Result};
pub use service::AgpsHandle;
