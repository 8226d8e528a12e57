//! Commands consumed by the AGPS actor.

use crate::agps::{
    ApnTypeMask, BearerCategory, BearerType, ConnHandle, MachineSnapshot, RequestType,
};
use bytes::Bytes;
use tokio::sync::oneshot;

/// Commands sent to the `AgpsActor`.
///
/// Requests from the GNSS engine, reports from the platform and restart
/// signals all become commands, so the manager sees them one at a time in
/// arrival order.
///
/// 发送到 `AgpsActor` 的命令。
///
/// 来自 GNSS 引擎的请求、来自平台的报告以及重启信号都会成为命令，
/// 因此管理器按到达顺序逐个处理它们。
#[derive(Debug)]
pub enum AgpsCommand {
    /// The engine needs a data connection.
    /// 引擎需要一个数据连接。
    RequestConnection {
        handle: ConnHandle,
        request_type: RequestType,
        apn_type_mask: ApnTypeMask,
    },
    /// The engine no longer needs a data connection.
    /// 引擎不再需要数据连接。
    ReleaseConnection { handle: ConnHandle },
    /// The platform opened a bearer.
    /// 平台已打开承载。
    ReportOpenSuccess {
        request_type: RequestType,
        apn: Bytes,
        bearer: BearerType,
    },
    /// The platform failed to open a bearer.
    /// 平台打开承载失败。
    ReportOpenFailure { request_type: RequestType },
    /// The platform closed a bearer.
    /// 平台已关闭承载。
    ReportClosed { request_type: RequestType },
    /// The modem subsystem restarted.
    /// 调制解调器子系统已重启。
    ModemRestart,
    /// Asks whether any state machine exists.
    /// 查询是否存在任何状态机。
    IsRegistered {
        response_tx: oneshot::Sender<bool>,
    },
    /// Asks for a read-only view of one category's state machine.
    /// 查询某个承载类别状态机的只读视图。
    Snapshot {
        category: BearerCategory,
        response_tx: oneshot::Sender<Option<MachineSnapshot>>,
    },
    /// Stops the actor after the commands queued before it.
    /// 在其之前排队的命令处理完后停止 actor。
    Shutdown,
}
