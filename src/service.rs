//! The service layer: the actor owning the connection manager, its commands,
//! the injected platform traits and the cloneable handle.
pub mod actor;
pub mod command;
pub mod handle;
pub mod traits;

pub use command::AgpsCommand;
pub use handle::AgpsHandle;
pub use traits::{AgnssStatusSink, ConnectivityPlatform};
