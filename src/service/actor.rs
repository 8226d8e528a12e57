//! The implementation of the `AgpsActor`.
//!
//! `AgpsActor` 的实现。

use super::{
    command::AgpsCommand,
    traits::{AgnssStatusSink, ConnectivityPlatform},
};
use crate::agps::{ConnectionManager, Effect};
use std::ops::ControlFlow;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// The actor that owns the connection manager.
///
/// It runs in a dedicated task and is the only writer of AGPS state. Each
/// command is applied to the manager, then every effect it produced is
/// dispatched to the platform or the status sink before the next command
/// is taken.
///
/// 拥有连接管理器的 actor。它在专用任务中运行，是 AGPS 状态的唯一写入者。
/// 每条命令应用到管理器后，其产生的所有效果都会在处理下一条命令之前分发出去。
pub(crate) struct AgpsActor<P: ConnectivityPlatform, S: AgnssStatusSink> {
    pub(crate) manager: ConnectionManager,
    pub(crate) platform: P,
    pub(crate) sink: S,
    pub(crate) command_rx: mpsc::Receiver<AgpsCommand>,
}

impl<P: ConnectivityPlatform, S: AgnssStatusSink> AgpsActor<P, S> {
    /// Runs the actor's main event loop.
    ///
    /// 运行 actor 的主事件循环。
    pub(crate) async fn run(&mut self) {
        while let Some(command) = self.command_rx.recv().await {
            let flow = self.handle_command(command);
            self.dispatch_effects().await;
            if flow.is_break() {
                break;
            }
        }
        info!("AGPS actor stopped");
    }

    fn handle_command(&mut self, command: AgpsCommand) -> ControlFlow<()> {
        let result = match command {
            AgpsCommand::RequestConnection {
                handle,
                request_type,
                apn_type_mask,
            } => self
                .manager
                .request_connection(handle, request_type, apn_type_mask),
            AgpsCommand::ReleaseConnection { handle } => {
                self.manager.release_connection(handle);
                Ok(())
            }
            AgpsCommand::ReportOpenSuccess {
                request_type,
                apn,
                bearer,
            } => self.manager.report_open_success(request_type, apn, bearer),
            AgpsCommand::ReportOpenFailure { request_type } => {
                self.manager.report_open_failure(request_type)
            }
            AgpsCommand::ReportClosed { request_type } => self.manager.report_closed(request_type),
            AgpsCommand::ModemRestart => {
                self.manager.handle_modem_restart();
                Ok(())
            }
            AgpsCommand::IsRegistered { response_tx } => {
                let _ = response_tx.send(self.manager.is_registered());
                Ok(())
            }
            AgpsCommand::Snapshot {
                category,
                response_tx,
            } => {
                let _ = response_tx.send(self.manager.snapshot(category));
                Ok(())
            }
            AgpsCommand::Shutdown => return ControlFlow::Break(()),
        };

        if let Err(e) = result {
            debug!("AGPS command rejected: {}", e);
        }
        ControlFlow::Continue(())
    }

    async fn dispatch_effects(&mut self) {
        while let Some(effect) = self.manager.poll_effect() {
            let status = effect.framework_status();
            let handle = effect.handle();
            let result = match effect {
                Effect::Open(request) => self.platform.open_data_connection(request).await,
                Effect::Close(request) => self.platform.close_data_connection(request).await,
                Effect::Notify(notification) => self.sink.on_status(notification).await,
            };
            if let Err(e) = result {
                error!(handle, ?status, "Failed to dispatch AGPS effect: {}", e);
            }
        }
    }
}
