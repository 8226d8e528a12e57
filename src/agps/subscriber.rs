//! One AGPS request as tracked by a state machine.
//!
//! 由状态机跟踪的单个 AGPS 请求。

use super::types::{ApnTypeMask, ConnHandle, RequestType};

/// Each subscriber corresponds to one AGPS request received by a state machine.
///
/// 每个订阅者对应状态机收到的一个 AGPS 请求。
#[derive(Debug, Clone)]
pub struct Subscriber {
    pub handle: ConnHandle,
    /// Whether this subscriber waits for the data call close to complete
    /// before being notified. While waiting it is inactive.
    /// 此订阅者是否在收到通知前等待数据连接关闭完成。等待期间处于非活动状态。
    pub wait_for_close_complete: bool,
    pub inactive: bool,
    pub apn_type_mask: ApnTypeMask,
    pub request_type: RequestType,
    /// Arrival order within the owning machine, assigned on insertion.
    pub(crate) seq: u64,
}

impl Subscriber {
    pub fn new(
        handle: ConnHandle,
        request_type: RequestType,
        apn_type_mask: ApnTypeMask,
        wait_for_close_complete: bool,
    ) -> Self {
        Self {
            handle,
            wait_for_close_complete,
            inactive: false,
            apn_type_mask,
            request_type,
            seq: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.inactive
    }
}

impl PartialEq for Subscriber {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle
    }
}

impl Eq for Subscriber {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_identity_is_the_handle() {
        let a = Subscriber::new(7, RequestType::Agnss, ApnTypeMask::SUPL, true);
        let mut b = Subscriber::new(7, RequestType::Internet, ApnTypeMask::DEFAULT, false);
        b.inactive = true;
        assert_eq!(a, b);

        let c = Subscriber::new(8, RequestType::Agnss, ApnTypeMask::SUPL, true);
        assert_ne!(a, c);
        assert!(a.is_active());
        assert!(!b.is_active());
    }
}
