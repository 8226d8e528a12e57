//! Traits for the collaborators the AGPS actor calls out to.
use crate::{
    agps::{CloseRequest, Effect, OpenRequest, StatusNotification},
    error::{Error, Result},
};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// The host platform's connectivity layer.
///
/// Requests are fire-and-forget: the answer arrives later as a
/// `report_*` call on the handle.
///
/// Methods run on the actor task, which waits for them before taking the
/// next command. They may enqueue commands through an [`AgpsHandle`], but
/// must not await a reply from it (`is_registered`, `snapshot`) or block on
/// a channel the actor itself drains; either deadlocks the actor. Failures
/// are reported as [`Error::Platform`] and only logged.
///
/// 主机平台的连接层。请求发出即忘：应答稍后以句柄上的 `report_*` 调用到达。
/// 方法运行在 actor 任务上；可以通过句柄排队命令，但不得等待 actor 的应答，否则会死锁。
///
/// [`AgpsHandle`]: super::AgpsHandle
#[async_trait]
pub trait ConnectivityPlatform: Send + Sync + 'static {
    /// Asks the platform to bring up a data bearer.
    async fn open_data_connection(&self, request: OpenRequest) -> Result<()>;

    /// Asks the platform to tear down a data bearer.
    async fn close_data_connection(&self, request: CloseRequest) -> Result<()>;
}

/// Receives per-subscriber status on behalf of the GNSS engine.
///
/// Runs on the actor task under the same rules as [`ConnectivityPlatform`].
///
/// 代表 GNSS 引擎接收每个订阅者的状态。与 [`ConnectivityPlatform`] 遵循相同的规则。
#[async_trait]
pub trait AgnssStatusSink: Send + Sync + 'static {
    async fn on_status(&self, notification: StatusNotification) -> Result<()>;
}

/// Relays requests as [`Effect`]s into a channel, for platforms living on
/// another task.
#[async_trait]
impl ConnectivityPlatform for mpsc::Sender<Effect> {
    async fn open_data_connection(&self, request: OpenRequest) -> Result<()> {
        self.send(Effect::Open(request))
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    async fn close_data_connection(&self, request: CloseRequest) -> Result<()> {
        self.send(Effect::Close(request))
            .await
            .map_err(|_| Error::ChannelClosed)
    }
}

#[async_trait]
impl AgnssStatusSink for mpsc::Sender<StatusNotification> {
    async fn on_status(&self, notification: StatusNotification) -> Result<()> {
        self.send(notification)
            .await
            .map_err(|_| Error::ChannelClosed)
    }
}
