//! The per-bearer AGPS connection state machine.
//!
//! One machine owns one physical data bearer and every request riding on it.
//! Requests are deduplicated into a single open/close lifecycle, and each
//! platform answer is fanned out to the subscribers it concerns.
//!
//! 每个承载一个的 AGPS 连接状态机。一个状态机拥有一个物理数据承载及其上的所有请求。
//! 请求被去重为单一的打开/关闭生命周期，平台的每个应答都会扇出给相关订阅者。

use super::bearer::BearerType;
use super::effect::{CloseRequest, Effect, OpenRequest, Outbox, StatusNotification};
use super::subscriber::Subscriber;
use super::types::{
    AgpsEvent, AgpsOutcome, AgpsState, ApnTypeMask, BearerCategory, ConnHandle, NotificationMode,
    RequestType,
};
use bytes::Bytes;
use std::collections::HashMap;
use tracing::{debug, info, trace, warn};

/// A read-only view of a state machine.
///
/// 状态机的只读视图。
#[derive(Debug, Clone, PartialEq)]
pub struct MachineSnapshot {
    pub category: BearerCategory,
    pub state: AgpsState,
    pub request_type: RequestType,
    pub apn_type_mask: ApnTypeMask,
    pub apn: Bytes,
    pub bearer: BearerType,
    /// Subscribers in arrival order.
    pub subscribers: Vec<Subscriber>,
}

impl MachineSnapshot {
    pub fn handles(&self) -> Vec<ConnHandle> {
        self.subscribers.iter().map(|s| s.handle).collect()
    }
}

/// AGPS connection state machine for one bearer category.
///
/// 单个承载类别的 AGPS 连接状态机。
#[derive(Debug)]
pub struct AgpsStateMachine {
    category: BearerCategory,
    state: AgpsState,
    /// All subscribers, keyed by handle. `seq` carries arrival order.
    /// 所有订阅者，以句柄为键。`seq` 记录到达顺序。
    subscribers: HashMap<ConnHandle, Subscriber>,
    next_seq: u64,
    request_type: RequestType,
    apn_type_mask: ApnTypeMask,
    apn: Bytes,
    bearer: BearerType,
    /// Last handle withdrawn while the bearer was wanted. Used as the close
    /// request's handle when the release is deferred past a pending open.
    last_withdrawn: Option<ConnHandle>,
}

impl AgpsStateMachine {
    pub fn new(category: BearerCategory) -> Self {
        Self {
            category,
            state: AgpsState::Released,
            subscribers: HashMap::new(),
            next_seq: 0,
            request_type: category.default_request_type(),
            apn_type_mask: ApnTypeMask::NONE,
            apn: Bytes::new(),
            bearer: BearerType::Invalid,
            last_withdrawn: None,
        }
    }

    pub fn category(&self) -> BearerCategory {
        self.category
    }

    pub fn state(&self) -> AgpsState {
        self.state
    }

    pub fn apn(&self) -> &Bytes {
        &self.apn
    }

    pub fn bearer(&self) -> BearerType {
        self.bearer
    }

    pub fn request_type(&self) -> RequestType {
        self.request_type
    }

    pub fn apn_type_mask(&self) -> ApnTypeMask {
        self.apn_type_mask
    }

    /// Replaces the APN buffer. The old buffer is released, never mutated.
    ///
    /// 替换 APN 缓冲区。旧缓冲区被释放，而不是原地修改。
    pub fn set_apn(&mut self, apn: Bytes) {
        self.apn = apn;
    }

    pub fn set_bearer(&mut self, bearer: BearerType) {
        self.bearer = bearer;
    }

    pub fn contains(&self, handle: ConnHandle) -> bool {
        self.subscribers.contains_key(&handle)
    }

    pub fn subscriber(&self, handle: ConnHandle) -> Option<&Subscriber> {
        self.subscribers.get(&handle)
    }

    /// Subscribers in arrival order.
    pub fn subscribers(&self) -> Vec<&Subscriber> {
        let mut all: Vec<&Subscriber> = self.subscribers.values().collect();
        all.sort_by_key(|s| s.seq);
        all
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            category: self.category,
            state: self.state,
            request_type: self.request_type,
            apn_type_mask: self.apn_type_mask,
            apn: self.apn.clone(),
            bearer: self.bearer,
            subscribers: self.subscribers().into_iter().cloned().collect(),
        }
    }

    /// Processes one event, appending any resulting effects to `outbox`.
    ///
    /// 处理一个事件，并将产生的效果追加到 `outbox`。
    pub fn process_event(&mut self, event: AgpsEvent, outbox: &mut Outbox) {
        trace!(
            category = ?self.category,
            state = ?self.state,
            event = event.name(),
            "Processing AGPS event"
        );

        match event {
            AgpsEvent::Subscribe(subscriber) => self.on_subscribe(subscriber, outbox),
            AgpsEvent::Unsubscribe(handle) => self.on_unsubscribe(handle, outbox),
            AgpsEvent::Granted { apn, bearer } => self.on_granted(apn, bearer, outbox),
            AgpsEvent::Released => self.on_released(outbox),
            AgpsEvent::Denied => self.on_denied(outbox),
        }
    }

    /// Drops every subscriber without notifying anyone and returns to
    /// `Released`. The bearer's real state is unknown after a modem restart.
    ///
    /// 丢弃所有订阅者且不通知任何一方，并回到 `Released`。调制解调器重启后承载的真实状态未知。
    pub fn drop_all_subscribers(&mut self) {
        let dropped = self.subscribers.len();
        self.subscribers.clear();
        self.apn = Bytes::new();
        self.bearer = BearerType::Invalid;
        self.last_withdrawn = None;
        if self.state != AgpsState::Released {
            self.transition(AgpsState::Released);
        }
        info!(
            category = ?self.category,
            dropped,
            "Dropped all AGPS subscribers"
        );
    }

    fn on_subscribe(&mut self, subscriber: Subscriber, outbox: &mut Outbox) {
        let handle = subscriber.handle;
        if self.contains(handle) {
            debug!(
                category = ?self.category,
                handle,
                "Subscriber already present, ignoring"
            );
            return;
        }
        self.request_type = subscriber.request_type;
        self.apn_type_mask = subscriber.apn_type_mask;
        self.add_subscriber(subscriber);

        match self.state {
            AgpsState::Released => {
                self.request_data_conn(handle, outbox);
                self.transition(AgpsState::Pending);
            }
            AgpsState::Pending => {
                debug!(category = ?self.category, handle, "Joining in-flight open");
            }
            AgpsState::Acquired => {
                if let Some(s) = self.subscribers.get(&handle) {
                    self.notify_subscriber(s, AgpsOutcome::Granted, outbox);
                }
            }
            AgpsState::Releasing => {
                debug!(
                    category = ?self.category,
                    handle,
                    "Queued until close completes"
                );
            }
        }
    }

    fn on_unsubscribe(&mut self, handle: ConnHandle, outbox: &mut Outbox) {
        let Some(subscriber) = self.subscribers.get_mut(&handle) else {
            debug!(
                category = ?self.category,
                handle,
                "Unsubscribe for unknown handle, ignoring"
            );
            return;
        };
        if subscriber.inactive {
            debug!(
                category = ?self.category,
                handle,
                "Subscriber already released, ignoring"
            );
            return;
        }

        match self.state {
            AgpsState::Pending => {
                self.subscribers.remove(&handle);
                self.last_withdrawn = Some(handle);
                if !self.any_active_subscribers() {
                    debug!(
                        category = ?self.category,
                        "No subscribers left, release deferred until the open completes"
                    );
                }
            }
            AgpsState::Acquired => {
                if subscriber.wait_for_close_complete {
                    subscriber.inactive = true;
                } else if let Some(removed) = self.subscribers.remove(&handle) {
                    self.notify_subscriber(&removed, AgpsOutcome::Released, outbox);
                }
                self.last_withdrawn = Some(handle);
                if !self.any_active_subscribers() {
                    self.release_data_conn(handle, outbox);
                    self.transition(AgpsState::Releasing);
                }
            }
            AgpsState::Releasing => {
                // Queued after the close was requested; never served.
                self.subscribers.remove(&handle);
            }
            AgpsState::Released => {
                warn!(
                    category = ?self.category,
                    handle,
                    "Subscriber present while released, removing"
                );
                self.subscribers.remove(&handle);
            }
        }
    }

    fn on_granted(&mut self, apn: Bytes, bearer: BearerType, outbox: &mut Outbox) {
        match self.state {
            AgpsState::Pending => {
                self.set_apn(apn);
                self.set_bearer(bearer);
                if self.any_active_subscribers() {
                    self.notify_subscribers(
                        AgpsOutcome::Granted,
                        false,
                        NotificationMode::ActiveOnly,
                        outbox,
                    );
                    self.transition(AgpsState::Acquired);
                } else {
                    let handle = self.last_withdrawn.unwrap_or_default();
                    self.release_data_conn(handle, outbox);
                    self.transition(AgpsState::Releasing);
                }
            }
            AgpsState::Releasing => self.complete_release(outbox),
            AgpsState::Released | AgpsState::Acquired => self.unexpected("GRANTED"),
        }
    }

    fn on_released(&mut self, outbox: &mut Outbox) {
        match self.state {
            AgpsState::Releasing => self.complete_release(outbox),
            AgpsState::Released | AgpsState::Pending | AgpsState::Acquired => {
                self.unexpected("RELEASED")
            }
        }
    }

    fn on_denied(&mut self, outbox: &mut Outbox) {
        match self.state {
            AgpsState::Pending => {
                self.notify_subscribers(AgpsOutcome::Denied, true, NotificationMode::All, outbox);
                self.subscribers.clear();
                self.last_withdrawn = None;
                self.transition(AgpsState::Released);
            }
            AgpsState::Released | AgpsState::Acquired | AgpsState::Releasing => {
                self.unexpected("DENIED")
            }
        }
    }

    /// The close finished: confirm it to everyone waiting on it, then serve
    /// any subscriber that queued up meanwhile with a fresh open.
    fn complete_release(&mut self, outbox: &mut Outbox) {
        self.notify_subscribers(
            AgpsOutcome::Released,
            true,
            NotificationMode::InactiveOnly,
            outbox,
        );
        self.last_withdrawn = None;

        let next = self
            .first_subscriber(false)
            .map(|s| (s.handle, s.request_type, s.apn_type_mask));
        match next {
            Some((handle, request_type, apn_type_mask)) => {
                self.request_type = request_type;
                self.apn_type_mask = apn_type_mask;
                self.request_data_conn(handle, outbox);
                self.transition(AgpsState::Pending);
            }
            None => self.transition(AgpsState::Released),
        }
    }

    fn add_subscriber(&mut self, mut subscriber: Subscriber) {
        subscriber.seq = self.next_seq;
        self.next_seq += 1;
        trace!(
            category = ?self.category,
            handle = subscriber.handle,
            "Subscriber added"
        );
        self.subscribers.insert(subscriber.handle, subscriber);
    }

    /// First subscriber in arrival order that is inactive (`true`) or active (`false`).
    fn first_subscriber(&self, inactive: bool) -> Option<&Subscriber> {
        self.subscribers
            .values()
            .filter(|s| s.inactive == inactive)
            .min_by_key(|s| s.seq)
    }

    fn any_active_subscribers(&self) -> bool {
        self.subscribers.values().any(Subscriber::is_active)
    }

    fn request_data_conn(&self, handle: ConnHandle, outbox: &mut Outbox) {
        debug!(
            category = ?self.category,
            handle,
            "Requesting data connection"
        );
        outbox.push_back(Effect::Open(OpenRequest {
            handle,
            apn: self.apn.clone(),
            bearer: self.bearer,
            request_type: self.request_type,
            apn_type_mask: self.apn_type_mask,
        }));
    }

    fn release_data_conn(&self, handle: ConnHandle, outbox: &mut Outbox) {
        debug!(
            category = ?self.category,
            handle,
            "Releasing data connection"
        );
        outbox.push_back(Effect::Close(CloseRequest {
            handle,
            request_type: self.request_type,
        }));
    }

    /// Fans `outcome` out to the subscribers selected by `mode`: active ones
    /// first, arrival order within each group. With `remove_after` the
    /// notified subscribers are forgotten.
    ///
    /// 将 `outcome` 扇出给 `mode` 选中的订阅者：先活动者，组内按到达顺序。
    /// 若 `remove_after` 为真，被通知的订阅者随即移除。
    fn notify_subscribers(
        &mut self,
        outcome: AgpsOutcome,
        remove_after: bool,
        mode: NotificationMode,
        outbox: &mut Outbox,
    ) {
        let mut targets: Vec<&Subscriber> = self
            .subscribers
            .values()
            .filter(|s| match mode {
                NotificationMode::All => true,
                NotificationMode::InactiveOnly => s.inactive,
                NotificationMode::ActiveOnly => !s.inactive,
            })
            .collect();
        targets.sort_by_key(|s| (s.inactive, s.seq));

        let handles: Vec<ConnHandle> = targets.iter().map(|s| s.handle).collect();
        for subscriber in targets {
            self.notify_subscriber(subscriber, outcome, outbox);
        }

        if remove_after {
            for handle in handles {
                self.subscribers.remove(&handle);
            }
        }
    }

    fn notify_subscriber(
        &self,
        subscriber: &Subscriber,
        outcome: AgpsOutcome,
        outbox: &mut Outbox,
    ) {
        trace!(
            category = ?self.category,
            handle = subscriber.handle,
            ?outcome,
            "Notifying subscriber"
        );
        outbox.push_back(Effect::Notify(StatusNotification {
            handle: subscriber.handle,
            outcome,
            apn: self.apn.clone(),
            bearer: self.bearer,
            request_type: subscriber.request_type,
        }));
    }

    fn unexpected(&self, event: &'static str) {
        warn!(
            category = ?self.category,
            state = ?self.state,
            event,
            "Unexpected AGPS event for current state, ignoring"
        );
    }

    fn transition(&mut self, new_state: AgpsState) {
        debug!(
            category = ?self.category,
            from = ?self.state,
            to = ?new_state,
            "AGPS state transition"
        );
        self.state = new_state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handles(outbox: &Outbox) -> Vec<ConnHandle> {
        outbox.iter().map(Effect::handle).collect()
    }

    #[test]
    fn test_fan_out_notifies_active_before_inactive() {
        let mut sm = AgpsStateMachine::new(BearerCategory::Agnss);
        for (handle, inactive) in [(1, true), (2, false), (3, true), (4, false)] {
            let mut s = Subscriber::new(handle, RequestType::Agnss, ApnTypeMask::SUPL, true);
            s.inactive = inactive;
            sm.add_subscriber(s);
        }

        let mut outbox = Outbox::new();
        sm.notify_subscribers(
            AgpsOutcome::Released,
            false,
            NotificationMode::All,
            &mut outbox,
        );
        assert_eq!(handles(&outbox), vec![2, 4, 1, 3]);

        outbox.clear();
        sm.notify_subscribers(
            AgpsOutcome::Granted,
            false,
            NotificationMode::ActiveOnly,
            &mut outbox,
        );
        assert_eq!(handles(&outbox), vec![2, 4]);

        outbox.clear();
        sm.notify_subscribers(
            AgpsOutcome::Released,
            true,
            NotificationMode::InactiveOnly,
            &mut outbox,
        );
        assert_eq!(handles(&outbox), vec![1, 3]);
        assert_eq!(sm.snapshot().handles(), vec![2, 4]);
        assert_eq!(sm.first_subscriber(false).map(|s| s.handle), Some(2));
        assert!(sm.first_subscriber(true).is_none());
    }

    #[test]
    fn test_set_apn_replaces_buffer() {
        let mut sm = AgpsStateMachine::new(BearerCategory::Internet);
        let first = Bytes::from_static(b"first.apn");
        sm.set_apn(first.clone());
        sm.set_apn(Bytes::from_static(b"second"));
        assert_eq!(sm.apn().as_ref(), b"second");
        assert_eq!(first.as_ref(), b"first.apn");
        assert_eq!(sm.request_type(), RequestType::Internet);
    }
}
