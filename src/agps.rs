//! AGPS data connection arbitration: subscribers, per-bearer state machines
//! and the manager routing between them.
pub mod bearer;
pub mod effect;
pub mod manager;
pub mod state_machine;
pub mod subscriber;
pub mod types;

pub use bearer::{ApnIpType, BearerType, bearer_type_to_ip_type, ip_type_to_bearer_type};
pub use effect::{CloseRequest, Effect, FrameworkStatus, OpenRequest, Outbox, StatusNotification};
pub use manager::ConnectionManager;
pub use state_machine::{AgpsStateMachine, MachineSnapshot};
pub use subscriber::Subscriber;
pub use types::{
    AgpsEvent, AgpsOutcome, AgpsState, ApnTypeMask, BearerCategory, ConnHandle, NotificationMode,
    RequestType,
};
