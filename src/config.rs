//! 定义了 AGPS 连接仲裁的可配置参数。
//! Defines configurable parameters for AGPS connection arbitration.

use std::ops::BitOr;

/// A bitmask of the ATL (AGPS transport layer) types the platform can serve.
///
/// 平台可以服务的 ATL（AGPS 传输层）类型位掩码。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AtlTypeMask(u8);

impl AtlTypeMask {
    pub const NONE: Self = Self(0);
    pub const SUPL: Self = Self(0x01);
    pub const SUPL_ES: Self = Self(0x02);
    pub const WWAN: Self = Self(0x04);
    pub const ALL: Self = Self(0x07);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for AtlTypeMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A structure containing all configurable parameters.
///
/// 包含所有可配置参数的结构体。
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Which bearer categories get a state machine.
    /// 哪些承载类别会创建状态机。
    pub atl: AtlConfig,

    /// Parameters applied to every new subscriber.
    /// 应用于每个新订阅者的参数。
    pub subscriber: SubscriberConfig,

    /// Actor and channel parameters.
    /// Actor 与通道参数。
    pub service: ServiceConfig,
}

/// Controls state machine creation.
///
/// 控制状态机的创建。
#[derive(Debug, Clone)]
pub struct AtlConfig {
    /// ATL types registered by the platform. The AGNSS machine needs both
    /// `SUPL` and `SUPL_ES`; the Internet machine needs `WWAN`.
    /// 平台注册的 ATL 类型。AGNSS 状态机需要 `SUPL` 和 `SUPL_ES`；Internet 状态机需要 `WWAN`。
    pub atl_types: AtlTypeMask,
    /// Whether the engine is MSA or MSB capable. Without it no AGNSS machine is created.
    /// 引擎是否支持 MSA 或 MSB。否则不会创建 AGNSS 状态机。
    pub agps_capable: bool,
}

/// Parameters applied to subscribers and the reports that serve them.
///
/// 应用于订阅者及其相关报告的参数。
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Whether a subscriber that releases an acquired connection waits for the
    /// close confirmation before being notified and forgotten.
    /// 释放已获取连接的订阅者是否等待关闭确认后才被通知并移除。
    pub wait_for_close_complete: bool,
    /// Longest APN accepted in an open-success report, in bytes.
    /// 打开成功报告中可接受的最长 APN（字节）。
    pub max_apn_len: usize,
}

/// Actor and channel parameters.
///
/// Actor 与通道参数。
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Capacity of the command channel feeding the actor.
    /// 为 actor 提供命令的通道容量。
    pub command_channel_capacity: usize,
}

impl Default for AtlConfig {
    fn default() -> Self {
        Self {
            atl_types: AtlTypeMask::ALL,
            agps_capable: true,
        }
    }
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            wait_for_close_complete: true,
            max_apn_len: 100,
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            command_channel_capacity: 128,
        }
    }
}
