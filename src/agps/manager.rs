//! Routes GNSS engine requests and platform reports to the state machine of
//! the right bearer category.
//!
//! 将 GNSS 引擎请求和平台报告路由到正确承载类别的状态机。

use super::bearer::BearerType;
use super::effect::{Effect, Outbox, StatusNotification};
use super::state_machine::{AgpsStateMachine, MachineSnapshot};
use super::subscriber::Subscriber;
use super::types::{AgpsEvent, AgpsOutcome, ApnTypeMask, BearerCategory, ConnHandle, RequestType};
use crate::{
    config::{AtlTypeMask, Config, SubscriberConfig},
    error::{Error, Result},
};
use bytes::Bytes;
use tracing::{debug, info, warn};

/// Owns one state machine per enabled bearer category.
///
/// The manager is sans-IO: every platform request and subscriber
/// notification is queued as an [`Effect`] and must be drained by the owner
/// with [`ConnectionManager::poll_effect`] or [`ConnectionManager::drain_effects`].
///
/// 为每个启用的承载类别拥有一个状态机。管理器不执行 I/O：所有平台请求和订阅者通知
/// 都作为 [`Effect`] 排队，由所有者取出。
#[derive(Debug)]
pub struct ConnectionManager {
    agnss: Option<AgpsStateMachine>,
    internet: Option<AgpsStateMachine>,
    subscriber_config: SubscriberConfig,
    outbox: Outbox,
}

impl ConnectionManager {
    /// Creates the state machines the configured ATL types allow.
    ///
    /// 创建配置的 ATL 类型所允许的状态机。
    pub fn new(config: &Config) -> Self {
        let atl = &config.atl;
        let internet = if atl.atl_types.contains(AtlTypeMask::WWAN) {
            Some(AgpsStateMachine::new(BearerCategory::Internet))
        } else {
            None
        };
        let agnss_types = AtlTypeMask::SUPL | AtlTypeMask::SUPL_ES;
        let agnss = if atl.agps_capable && atl.atl_types.contains(agnss_types) {
            Some(AgpsStateMachine::new(BearerCategory::Agnss))
        } else {
            None
        };

        info!(
            agnss = agnss.is_some(),
            internet = internet.is_some(),
            atl_types = atl.atl_types.bits(),
            "AGPS state machines created"
        );

        Self {
            agnss,
            internet,
            subscriber_config: config.subscriber.clone(),
            outbox: Outbox::new(),
        }
    }

    /// Whether at least one state machine exists.
    pub fn is_registered(&self) -> bool {
        self.agnss.is_some() || self.internet.is_some()
    }

    pub fn state_machine(&self, category: BearerCategory) -> Option<&AgpsStateMachine> {
        match category {
            BearerCategory::Agnss => self.agnss.as_ref(),
            BearerCategory::Internet => self.internet.as_ref(),
        }
    }

    fn state_machine_mut(&mut self, category: BearerCategory) -> Option<&mut AgpsStateMachine> {
        match category {
            BearerCategory::Agnss => self.agnss.as_mut(),
            BearerCategory::Internet => self.internet.as_mut(),
        }
    }

    pub fn snapshot(&self, category: BearerCategory) -> Option<MachineSnapshot> {
        self.state_machine(category).map(AgpsStateMachine::snapshot)
    }

    /// Handles an ATL request from the GNSS engine.
    ///
    /// A request no state machine can serve is denied straight back to the
    /// engine and reported as an error; no machine changes state.
    ///
    /// 处理来自 GNSS 引擎的 ATL 请求。无状态机可服务的请求会被直接拒绝并返回错误。
    pub fn request_connection(
        &mut self,
        handle: ConnHandle,
        request_type: RequestType,
        apn_type_mask: ApnTypeMask,
    ) -> Result<()> {
        debug!(
            handle,
            ?request_type,
            apn_type_mask = apn_type_mask.bits(),
            "Request ATL"
        );
        let wait_for_close_complete = self.subscriber_config.wait_for_close_complete;
        let sm = match request_type.category() {
            BearerCategory::Agnss => self.agnss.as_mut(),
            BearerCategory::Internet => self.internet.as_mut(),
        };
        let Some(sm) = sm else {
            warn!(
                handle,
                ?request_type,
                "No AGPS state machine for request type"
            );
            self.outbox.push_back(Effect::Notify(StatusNotification {
                handle,
                outcome: AgpsOutcome::Denied,
                apn: Bytes::new(),
                bearer: BearerType::Invalid,
                request_type,
            }));
            return Err(Error::NoStateMachine(request_type));
        };

        let subscriber =
            Subscriber::new(handle, request_type, apn_type_mask, wait_for_close_complete);
        sm.process_event(AgpsEvent::Subscribe(subscriber), &mut self.outbox);
        Ok(())
    }

    /// Handles an ATL release from the GNSS engine. Handles are unique across
    /// the manager, so at most one machine holds it.
    ///
    /// 处理来自 GNSS 引擎的 ATL 释放。句柄在管理器内唯一，最多一个状态机持有它。
    pub fn release_connection(&mut self, handle: ConnHandle) {
        let sm = [self.agnss.as_mut(), self.internet.as_mut()]
            .into_iter()
            .flatten()
            .find(|sm| sm.contains(handle));

        match sm {
            Some(sm) => sm.process_event(AgpsEvent::Unsubscribe(handle), &mut self.outbox),
            None => warn!(handle, "Subscriber not found in any AGPS state machine"),
        }
    }

    /// The platform opened the bearer for `request_type`.
    pub fn report_open_success(
        &mut self,
        request_type: RequestType,
        apn: Bytes,
        bearer: BearerType,
    ) -> Result<()> {
        if apn.is_empty() {
            warn!(?request_type, "Rejecting open success with empty APN");
            return Err(Error::InvalidApn("empty".to_string()));
        }
        let max = self.subscriber_config.max_apn_len;
        let len = apn.len();
        if len > max {
            warn!(
                ?request_type,
                len,
                max,
                "Rejecting open success with oversized APN"
            );
            return Err(Error::InvalidApn(format!("{len} bytes exceeds {max}")));
        }
        debug!(
            ?request_type,
            apn = %String::from_utf8_lossy(&apn),
            ?bearer,
            "ATL open success"
        );
        self.forward(request_type, AgpsEvent::Granted { apn, bearer })
    }

    /// The platform failed to open the bearer for `request_type`.
    pub fn report_open_failure(&mut self, request_type: RequestType) -> Result<()> {
        debug!(?request_type, "ATL open failed");
        self.forward(request_type, AgpsEvent::Denied)
    }

    /// The platform closed the bearer for `request_type`.
    pub fn report_closed(&mut self, request_type: RequestType) -> Result<()> {
        debug!(?request_type, "ATL closed");
        self.forward(request_type, AgpsEvent::Released)
    }

    /// Drops every subscriber of every machine after a modem subsystem restart.
    ///
    /// 调制解调器子系统重启后丢弃所有状态机的所有订阅者。
    pub fn handle_modem_restart(&mut self) {
        info!("Handling modem restart");
        for category in BearerCategory::ALL {
            if let Some(sm) = self.state_machine_mut(category) {
                sm.drop_all_subscribers();
            }
        }
    }

    /// Takes the oldest queued effect.
    pub fn poll_effect(&mut self) -> Option<Effect> {
        self.outbox.pop_front()
    }

    /// Takes every queued effect, oldest first.
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        self.outbox.drain(..).collect()
    }

    fn forward(&mut self, request_type: RequestType, event: AgpsEvent) -> Result<()> {
        let sm = match request_type.category() {
            BearerCategory::Agnss => self.agnss.as_mut(),
            BearerCategory::Internet => self.internet.as_mut(),
        };
        match sm {
            Some(sm) => {
                sm.process_event(event, &mut self.outbox);
                Ok(())
            }
            None => {
                warn!(
                    ?request_type,
                    event = event.name(),
                    "No AGPS state machine for report"
                );
                Err(Error::NoStateMachine(request_type))
            }
        }
    }
}
