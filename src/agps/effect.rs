//! Outbound effects queued by the state machines.
//!
//! The state machines never call out directly. Each step appends effects to
//! an outbox that the owner drains and dispatches once the step is complete.
//!
//! 状态机排队的出站效果。状态机从不直接调用外部；每一步都将效果追加到发件箱，
//! 由所有者在该步完成后取出并分发。

use super::bearer::BearerType;
use super::types::{AgpsOutcome, ApnTypeMask, ConnHandle, RequestType};
use bytes::Bytes;
use std::collections::VecDeque;

/// Queue of effects awaiting dispatch, in emission order.
pub type Outbox = VecDeque<Effect>;

/// Ask the platform to bring up a data bearer.
///
/// 请求平台建立数据承载。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    /// Handle of the subscriber whose arrival triggered the open.
    pub handle: ConnHandle,
    /// Last APN known to the machine; empty before the first grant.
    pub apn: Bytes,
    pub bearer: BearerType,
    pub request_type: RequestType,
    pub apn_type_mask: ApnTypeMask,
}

/// Ask the platform to tear down a data bearer.
///
/// 请求平台拆除数据承载。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseRequest {
    /// Handle of the subscriber whose withdrawal triggered the close.
    pub handle: ConnHandle,
    pub request_type: RequestType,
}

/// Status delivered to one subscriber.
///
/// 发送给单个订阅者的状态。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusNotification {
    pub handle: ConnHandle,
    pub outcome: AgpsOutcome,
    pub apn: Bytes,
    pub bearer: BearerType,
    pub request_type: RequestType,
}

/// AGNSS status values in the vocabulary of the platform framework.
///
/// 平台框架词汇中的 AGNSS 状态值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameworkStatus {
    RequestDataConn,
    ReleaseDataConn,
    DataConnected,
    DataConnDone,
    DataConnFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Open(OpenRequest),
    Close(CloseRequest),
    Notify(StatusNotification),
}

impl Effect {
    pub fn framework_status(&self) -> FrameworkStatus {
        match self {
            Effect::Open(_) => FrameworkStatus::RequestDataConn,
            Effect::Close(_) => FrameworkStatus::ReleaseDataConn,
            Effect::Notify(n) => match n.outcome {
                AgpsOutcome::Granted => FrameworkStatus::DataConnected,
                AgpsOutcome::Released => FrameworkStatus::DataConnDone,
                AgpsOutcome::Denied => FrameworkStatus::DataConnFailed,
            },
        }
    }

    pub fn handle(&self) -> ConnHandle {
        match self {
            Effect::Open(r) => r.handle,
            Effect::Close(r) => r.handle,
            Effect::Notify(n) => n.handle,
        }
    }
}
