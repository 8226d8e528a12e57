//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use crate::agps::RequestType;
use thiserror::Error;

/// The primary error type for the AGPS arbitration library.
/// AGPS 仲裁库的主要错误类型。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// The GNSS engine supplied a request type code this library does not know.
    /// GNSS 引擎提供了本库无法识别的请求类型代码。
    #[error("Unknown AGPS request type code: {0}")]
    UnknownRequestType(i32),

    /// No state machine was created for the bearer category serving this request type.
    /// 没有为服务此请求类型的承载类别创建状态机。
    #[error("No AGPS state machine for request type {0:?}")]
    NoStateMachine(RequestType),

    /// The APN reported by the platform is empty or too long.
    /// 平台报告的 APN 为空或过长。
    #[error("Invalid APN: {0}")]
    InvalidApn(String),

    /// A platform or status-sink implementation failed to deliver a message.
    /// 平台或状态接收端实现未能投递消息。
    #[error("Platform callback failed: {0}")]
    Platform(String),

    /// An internal channel for communication between tasks was closed unexpectedly.
    /// 用于任务间通信的内部通道意外关闭。
    #[error("Internal channel is broken")]
    ChannelClosed,
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;
