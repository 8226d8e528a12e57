//! Core value types shared by the AGPS state machines and the manager.
//!
//! AGPS 状态机与管理器共享的核心值类型。

use super::bearer::BearerType;
use super::subscriber::Subscriber;
use crate::error::Error;
use bytes::Bytes;
use std::ops::BitOr;

/// Opaque identity of one logical AGPS request, assigned by the GNSS engine.
/// 由 GNSS 引擎分配的单个逻辑 AGPS 请求的不透明标识。
pub type ConnHandle = i32;

/// The kind of data connection the GNSS engine asks for.
///
/// GNSS 引擎请求的数据连接类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    /// SUPL assistance over the AGNSS bearer.
    Agnss,
    /// General Internet access, e.g. for XTRA downloads.
    Internet,
    /// Emergency SUPL, served by the AGNSS bearer.
    EmergencyAgnss,
}

impl RequestType {
    /// Raw engine code for SUPL.
    pub const SUPL_CODE: i32 = 1;
    /// Raw engine code for any WWAN (Internet) connection.
    pub const WWAN_ANY_CODE: i32 = 3;
    /// Raw engine code for emergency SUPL.
    pub const SUPL_ES_CODE: i32 = 5;

    /// The bearer category whose state machine owns requests of this type.
    ///
    /// 拥有此类型请求的状态机所属的承载类别。
    pub fn category(self) -> BearerCategory {
        match self {
            RequestType::Agnss | RequestType::EmergencyAgnss => BearerCategory::Agnss,
            RequestType::Internet => BearerCategory::Internet,
        }
    }

    pub fn code(self) -> i32 {
        match self {
            RequestType::Agnss => Self::SUPL_CODE,
            RequestType::Internet => Self::WWAN_ANY_CODE,
            RequestType::EmergencyAgnss => Self::SUPL_ES_CODE,
        }
    }
}

impl TryFrom<i32> for RequestType {
    type Error = Error;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            Self::SUPL_CODE => Ok(RequestType::Agnss),
            Self::WWAN_ANY_CODE => Ok(RequestType::Internet),
            Self::SUPL_ES_CODE => Ok(RequestType::EmergencyAgnss),
            other => Err(Error::UnknownRequestType(other)),
        }
    }
}

/// A physical bearer slot. Each category has at most one state machine.
///
/// 物理承载槽位。每个类别最多有一个状态机。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BearerCategory {
    Agnss,
    Internet,
}

impl BearerCategory {
    pub const ALL: [BearerCategory; 2] = [BearerCategory::Agnss, BearerCategory::Internet];

    /// The request type a freshly created machine of this category reports
    /// until its first subscriber arrives.
    pub fn default_request_type(self) -> RequestType {
        match self {
            BearerCategory::Agnss => RequestType::Agnss,
            BearerCategory::Internet => RequestType::Internet,
        }
    }
}

/// The APN/application types a request needs, as a bitmask.
///
/// 请求所需的 APN/应用类型位掩码。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ApnTypeMask(u32);

impl ApnTypeMask {
    pub const NONE: Self = Self(0);
    pub const DEFAULT: Self = Self(1 << 0);
    pub const IMS: Self = Self(1 << 1);
    pub const MMS: Self = Self(1 << 2);
    pub const DUN: Self = Self(1 << 3);
    pub const SUPL: Self = Self(1 << 4);
    pub const HIPRI: Self = Self(1 << 5);
    pub const FOTA: Self = Self(1 << 6);
    pub const CBS: Self = Self(1 << 7);
    pub const IA: Self = Self(1 << 8);
    pub const EMERGENCY: Self = Self(1 << 9);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ApnTypeMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Lifecycle state of a connection state machine.
///
/// 连接状态机的生命周期状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgpsState {
    /// Idle. No connection open, none requested.
    /// 空闲。没有打开或请求中的连接。
    #[default]
    Released,
    /// Open requested, awaiting the platform.
    /// 已请求打开，等待平台响应。
    Pending,
    /// Connection open and usable.
    /// 连接已打开且可用。
    Acquired,
    /// Close requested, awaiting the platform.
    /// 已请求关闭，等待平台响应。
    Releasing,
}

/// An input to a connection state machine.
///
/// 连接状态机的输入事件。
#[derive(Debug, Clone, PartialEq)]
pub enum AgpsEvent {
    /// A new logical request arrives.
    Subscribe(Subscriber),
    /// A request is withdrawn.
    Unsubscribe(ConnHandle),
    /// The platform opened the bearer.
    Granted { apn: Bytes, bearer: BearerType },
    /// The platform closed the bearer.
    Released,
    /// The platform failed to open the bearer.
    Denied,
}

impl AgpsEvent {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            AgpsEvent::Subscribe(_) => "SUBSCRIBE",
            AgpsEvent::Unsubscribe(_) => "UNSUBSCRIBE",
            AgpsEvent::Granted { .. } => "GRANTED",
            AgpsEvent::Released => "RELEASED",
            AgpsEvent::Denied => "DENIED",
        }
    }
}

/// The outcome reported to a subscriber.
///
/// 报告给订阅者的结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgpsOutcome {
    Granted,
    Released,
    Denied,
}

/// Which subscribers a fan-out targets.
///
/// 通知扇出的目标订阅者。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationMode {
    /// Active subscribers first, then inactive ones.
    All,
    /// Subscribers already released but waiting for close confirmation.
    InactiveOnly,
    ActiveOnly,
}
