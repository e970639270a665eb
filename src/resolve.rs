//! Hostname resolution.

use crate::error::{Result, TcpingError};
use anyhow::Context;
use std::net::IpAddr;
use tokio::net::lookup_host;
use tracing::debug;

/// Address family restriction from `-4` / `-6`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Family {
    #[default]
    Any,
    V4,
    V6,
}

impl Family {
    fn accepts(self, ip: &IpAddr) -> bool {
        match self {
            Family::Any => true,
            Family::V4 => ip.is_ipv4(),
            Family::V6 => ip.is_ipv6(),
        }
    }
}

/// `true` when `host` is already an IP literal and needs no lookup.
pub fn is_literal_ip(host: &str) -> bool {
    host.trim_matches(['[', ']']).parse::<IpAddr>().is_ok()
}

/// Resolve `host` to a single address of the requested family.
pub async fn resolve(host: &str, port: u16, family: Family) -> Result<IpAddr> {
    if let Ok(ip) = host.trim_matches(['[', ']']).parse::<IpAddr>() {
        return if family.accepts(&ip) {
            Ok(ip)
        } else {
            Err(TcpingError::InvalidTarget(format!(
                "{ip} does not match the requested address family"
            )))
        };
    }

    let addrs = lookup_host((host, port))
        .await
        .with_context(|| format!("resolving {host}"))?;

    let ip = addrs
        .map(|sa| sa.ip())
        .find(|ip| family.accepts(ip))
        .ok_or_else(|| TcpingError::Resolve {
            host: host.to_owned(),
        })?;

    debug!(host, %ip, "resolved");
    Ok(ip)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_detection() {
        assert!(is_literal_ip("127.0.0.1"));
        assert!(is_literal_ip("::1"));
        assert!(is_literal_ip("[::1]"));
        assert!(!is_literal_ip("example.com"));
    }

    #[tokio::test]
    async fn literal_short_circuits() {
        let ip = resolve("10.1.2.3", 80, Family::Any).await.unwrap();
        assert_eq!(ip, "10.1.2.3".parse::<IpAddr>().unwrap());
    }

    #[tokio::test]
    async fn literal_family_mismatch_is_rejected() {
        let err = resolve("10.1.2.3", 80, Family::V6).await.unwrap_err();
        assert!(matches!(err, TcpingError::InvalidTarget(_)));
    }
}
