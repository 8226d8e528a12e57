//! The user-facing API of the AGPS service.

use super::{
    actor::AgpsActor,
    command::AgpsCommand,
    traits::{AgnssStatusSink, ConnectivityPlatform},
};
use crate::{
    agps::{
        ApnIpType, ApnTypeMask, BearerCategory, BearerType, ConnHandle, ConnectionManager,
        MachineSnapshot, RequestType, ip_type_to_bearer_type,
    },
    config::Config,
    error::{Error, Result},
};
use bytes::Bytes;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// A handle to the `AgpsActor`.
///
/// Both the GNSS engine side and the platform side hold clones of this
/// handle; every call only enqueues a command for the actor.
///
/// `AgpsActor` 的句柄。GNSS 引擎侧和平台侧都持有该句柄的克隆；每次调用只是为 actor 排队一条命令。
#[derive(Debug, Clone)]
pub struct AgpsHandle {
    command_tx: mpsc::Sender<AgpsCommand>,
}

impl AgpsHandle {
    /// Creates the connection manager, wires it to `platform` and `sink`,
    /// and spawns the actor on the current tokio runtime.
    ///
    /// 创建连接管理器，将其连接到 `platform` 和 `sink`，并在当前 tokio 运行时上启动 actor。
    pub fn spawn<P, S>(config: Config, platform: P, sink: S) -> Self
    where
        P: ConnectivityPlatform,
        S: AgnssStatusSink,
    {
        let (command_tx, command_rx) = mpsc::channel(config.service.command_channel_capacity);
        let manager = ConnectionManager::new(&config);

        let mut actor = AgpsActor {
            manager,
            platform,
            sink,
            command_rx,
        };

        info!("AGPS actor created and running");
        tokio::spawn(async move {
            actor.run().await;
        });

        Self { command_tx }
    }

    async fn send(&self, command: AgpsCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| Error::ChannelClosed)
    }

    /// Requests a data connection for `handle`. The outcome arrives at the
    /// status sink.
    ///
    /// 为 `handle` 请求数据连接。结果将发送到状态接收端。
    pub async fn request_connection(
        &self,
        handle: ConnHandle,
        request_type: RequestType,
        apn_type_mask: ApnTypeMask,
    ) -> Result<()> {
        self.send(AgpsCommand::RequestConnection {
            handle,
            request_type,
            apn_type_mask,
        })
        .await
    }

    /// Like [`AgpsHandle::request_connection`], taking the engine's raw type code.
    pub async fn request_connection_code(
        &self,
        handle: ConnHandle,
        type_code: i32,
        apn_type_mask: ApnTypeMask,
    ) -> Result<()> {
        let request_type = RequestType::try_from(type_code).inspect_err(|e| {
            warn!(handle, type_code, "Rejecting ATL request: {}", e);
        })?;
        self.request_connection(handle, request_type, apn_type_mask)
            .await
    }

    /// Withdraws the request for `handle`. A no-op for unknown handles.
    ///
    /// 撤回 `handle` 的请求。未知句柄不做任何操作。
    pub async fn release_connection(&self, handle: ConnHandle) -> Result<()> {
        self.send(AgpsCommand::ReleaseConnection { handle }).await
    }

    /// Reports that the platform opened the bearer serving `request_type`.
    ///
    /// 报告平台已打开服务 `request_type` 的承载。
    pub async fn report_open_success(
        &self,
        request_type: RequestType,
        apn: impl Into<Bytes>,
        bearer: BearerType,
    ) -> Result<()> {
        self.send(AgpsCommand::ReportOpenSuccess {
            request_type,
            apn: apn.into(),
            bearer,
        })
        .await
    }

    /// Reports that the platform failed to open the bearer.
    /// 报告平台打开承载失败。
    pub async fn report_open_failure(&self, request_type: RequestType) -> Result<()> {
        self.send(AgpsCommand::ReportOpenFailure { request_type })
            .await
    }

    /// Reports that the platform closed the bearer.
    /// 报告平台已关闭承载。
    pub async fn report_closed(&self, request_type: RequestType) -> Result<()> {
        self.send(AgpsCommand::ReportClosed { request_type }).await
    }

    /// Drops every subscriber without notification after a modem restart.
    /// 调制解调器重启后丢弃所有订阅者且不发送通知。
    pub async fn handle_modem_restart(&self) -> Result<()> {
        self.send(AgpsCommand::ModemRestart).await
    }

    /// Platform bridge: the AGNSS data connection opened on `apn`.
    ///
    /// 平台桥接：AGNSS 数据连接已在 `apn` 上打开。
    pub async fn data_conn_open(&self, apn: &str, ip_type: ApnIpType) -> Result<()> {
        if apn.is_empty() {
            warn!("Invalid APN");
            return Err(Error::InvalidApn("empty".to_string()));
        }
        debug!(apn, ?ip_type, "dataConnOpen");
        let bearer = ip_type_to_bearer_type(ip_type);
        self.report_open_success(
            RequestType::Agnss,
            Bytes::copy_from_slice(apn.as_bytes()),
            bearer,
        )
        .await
    }

    /// Platform bridge: the AGNSS data connection closed.
    pub async fn data_conn_closed(&self) -> Result<()> {
        self.report_closed(RequestType::Agnss).await
    }

    /// Platform bridge: the AGNSS data connection failed to open.
    pub async fn data_conn_failed(&self) -> Result<()> {
        self.report_open_failure(RequestType::Agnss).await
    }

    /// Whether the actor's manager has at least one state machine.
    pub async fn is_registered(&self) -> Result<bool> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(AgpsCommand::IsRegistered { response_tx }).await?;
        response_rx.await.map_err(|_| Error::ChannelClosed)
    }

    /// A read-only view of the state machine for `category`, if it exists.
    /// `category` 对应状态机的只读视图（若存在）。
    pub async fn snapshot(&self, category: BearerCategory) -> Result<Option<MachineSnapshot>> {
        let (response_tx, response_rx) = oneshot::channel();
        self.send(AgpsCommand::Snapshot {
            category,
            response_tx,
        })
        .await?;
        response_rx.await.map_err(|_| Error::ChannelClosed)
    }

    /// Stops the actor once the commands queued before this call are processed.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(AgpsCommand::Shutdown).await
    }
}
