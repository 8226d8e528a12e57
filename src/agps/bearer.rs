//! Mapping between the GNSS engine's APN IP type and the platform bearer type.
//!
//! GNSS 引擎的 APN IP 类型与平台承载类型之间的映射。

/// IP type of an APN, as the GNSS engine names it.
///
/// GNSS 引擎所使用的 APN IP 类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApnIpType {
    #[default]
    Unspecified,
    Ipv4,
    Ipv6,
    Ipv4v6,
}

/// Bearer type of a data connection, as the platform names it.
///
/// 平台所使用的数据连接承载类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BearerType {
    #[default]
    Invalid,
    Ipv4,
    Ipv6,
    Ipv4v6,
}

impl From<i32> for ApnIpType {
    fn from(code: i32) -> Self {
        match code {
            1 => ApnIpType::Ipv4,
            2 => ApnIpType::Ipv6,
            3 => ApnIpType::Ipv4v6,
            _ => ApnIpType::Unspecified,
        }
    }
}

impl From<i32> for BearerType {
    fn from(code: i32) -> Self {
        match code {
            1 => BearerType::Ipv4,
            2 => BearerType::Ipv6,
            3 => BearerType::Ipv4v6,
            _ => BearerType::Invalid,
        }
    }
}

/// Maps an engine IP type to the platform bearer type.
///
/// A missing hint must not block an otherwise valid request, so anything
/// unmapped becomes IPv4.
pub fn ip_type_to_bearer_type(ip_type: ApnIpType) -> BearerType {
    match ip_type {
        ApnIpType::Ipv4 => BearerType::Ipv4,
        ApnIpType::Ipv6 => BearerType::Ipv6,
        ApnIpType::Ipv4v6 => BearerType::Ipv4v6,
        ApnIpType::Unspecified => BearerType::Ipv4,
    }
}

/// Maps a platform bearer type back to the engine IP type, IPv4 when unmapped.
pub fn bearer_type_to_ip_type(bearer: BearerType) -> ApnIpType {
    match bearer {
        BearerType::Ipv4 => ApnIpType::Ipv4,
        BearerType::Ipv6 => ApnIpType::Ipv6,
        BearerType::Ipv4v6 => ApnIpType::Ipv4v6,
        BearerType::Invalid => ApnIpType::Ipv4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types_map_one_to_one() {
        for (ip, bearer) in [
            (ApnIpType::Ipv4, BearerType::Ipv4),
            (ApnIpType::Ipv6, BearerType::Ipv6),
            (ApnIpType::Ipv4v6, BearerType::Ipv4v6),
        ] {
            assert_eq!(ip_type_to_bearer_type(ip), bearer);
            assert_eq!(bearer_type_to_ip_type(bearer), ip);
        }
    }

    #[test]
    fn test_unmapped_values_fall_back_to_ipv4() {
        assert_eq!(
            ip_type_to_bearer_type(ApnIpType::Unspecified),
            BearerType::Ipv4
        );
        assert_eq!(bearer_type_to_ip_type(BearerType::Invalid), ApnIpType::Ipv4);
        assert_eq!(
            ip_type_to_bearer_type(ApnIpType::from(42)),
            BearerType::Ipv4
        );
        assert_eq!(BearerType::from(-1), BearerType::Invalid);
    }
}
