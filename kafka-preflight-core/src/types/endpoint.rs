//! Broker endpoint parsing

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PreflightError, PreflightResult};

/// Conventional Kafka listener port.
pub const DEFAULT_KAFKA_PORT: u16 = 9092;

/// A single addressable broker, parsed from a `host:port` token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrokerEndpoint {
    pub host: String,
    pub port: u16,
}

impl BrokerEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse a comma-separated broker list.
    ///
    /// Tokens are trimmed and empty tokens are skipped, so `""`, `"  "` and `" , "`
    /// all yield an empty list. Callers decide whether an empty list is an error.
    pub fn parse_list(raw: &str) -> PreflightResult<Vec<Self>> {
        raw.split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::parse)
            .collect()
    }

    /// `host:port` form accepted by Kafka clients (IPv6 hosts are bracketed).
    pub fn address(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for BrokerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for BrokerEndpoint {
    type Err = PreflightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();

        let (host, port) = if let Some(rest) = token.strip_prefix('[') {
            // [v6]:port or [v6]
            let (host, tail) = rest.split_once(']').ok_or_else(|| {
                PreflightError::Configuration(format!("unterminated IPv6 bracket in '{token}'"))
            })?;
            let port = match tail {
                "" => None,
                _ => Some(tail.strip_prefix(':').ok_or_else(|| {
                    PreflightError::Configuration(format!("unexpected text after ']' in '{token}'"))
                })?),
            };
            (host, port)
        } else {
            match token.rsplit_once(':') {
                // Bare IPv6 literal without brackets, no port.
                Some((host, _)) if host.contains(':') => {
                    if token.parse::<Ipv6Addr>().is_err() {
                        return Err(PreflightError::Configuration(format!(
                            "too many ':' in broker '{token}' (bracket IPv6 hosts)"
                        )));
                    }
                    (token, None)
                }
                Some((host, port)) => (host, Some(port)),
                None => (token, None),
            }
        };

        if host.is_empty() {
            return Err(PreflightError::Configuration(format!(
                "missing host in broker '{token}'"
            )));
        }
        if host.contains(char::is_whitespace) {
            return Err(PreflightError::Configuration(format!(
                "whitespace in broker host '{token}' (separate brokers with ',')"
            )));
        }

        let port = match port {
            None => DEFAULT_KAFKA_PORT,
            Some(p) => match p.parse::<u16>() {
                Ok(0) | Err(_) => {
                    return Err(PreflightError::Configuration(format!(
                        "invalid port '{p}' in broker '{token}'"
                    )));
                }
                Ok(port) => port,
            },
        };

        Ok(Self::new(host, port))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_host_and_port() {
        let ep: BrokerEndpoint = "kafka-0.internal:19092".parse().unwrap();
        assert_eq!(ep, BrokerEndpoint::new("kafka-0.internal", 19092));
    }

    #[test]
    fn missing_port_defaults_to_9092() {
        let ep: BrokerEndpoint = "kafka".parse().unwrap();
        assert_eq!(ep.port, DEFAULT_KAFKA_PORT);
    }

    #[test]
    fn bracketed_ipv6() {
        let ep: BrokerEndpoint = "[::1]:9093".parse().unwrap();
        assert_eq!(ep.host, "::1");
        assert_eq!(ep.port, 9093);
        assert_eq!(ep.address(), "[::1]:9093");

        let ep: BrokerEndpoint = "[fe80::1]".parse().unwrap();
        assert_eq!(ep.port, DEFAULT_KAFKA_PORT);
    }

    #[test]
    fn bare_ipv6_without_port() {
        let ep: BrokerEndpoint = "2001:db8::10".parse().unwrap();
        assert_eq!(ep.host, "2001:db8::10");
        assert_eq!(ep.port, DEFAULT_KAFKA_PORT);
    }

    #[test]
    fn rejects_bad_ports() {
        for raw in [
            "kafka:abc",
            "kafka:0",
            "kafka:70000",
            "kafka:",
            "kafka-1:9092:9093",
            "2001:db8::zz",
        ] {
            assert!(
                matches!(
                    raw.parse::<BrokerEndpoint>(),
                    Err(PreflightError::Configuration(_))
                ),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_missing_host() {
        assert!(":9092".parse::<BrokerEndpoint>().is_err());
        assert!("[]:9092".parse::<BrokerEndpoint>().is_err());
    }

    #[test]
    fn rejects_space_separated_brokers() {
        for raw in ["kafka-1:9092 kafka-2:9092", "kafka 1", "[::1 ]:9092"] {
            assert!(
                matches!(
                    raw.parse::<BrokerEndpoint>(),
                    Err(PreflightError::Configuration(_))
                ),
                "{raw} should be rejected"
            );
        }
        assert!(BrokerEndpoint::parse_list("kafka-1:9092 kafka-2:9092").is_err());
    }

    #[test]
    fn list_skips_empty_tokens_and_keeps_order() {
        let list = BrokerEndpoint::parse_list(" b:1 ,, a:2 ,").unwrap();
        assert_eq!(
            list,
            vec![BrokerEndpoint::new("b", 1), BrokerEndpoint::new("a", 2)]
        );
    }

    #[test]
    fn list_empty_and_whitespace() {
        assert!(BrokerEndpoint::parse_list("").unwrap().is_empty());
        assert!(BrokerEndpoint::parse_list("   ").unwrap().is_empty());
        assert!(BrokerEndpoint::parse_list(" , ").unwrap().is_empty());
    }

    #[test]
    fn list_propagates_invalid_token() {
        assert!(BrokerEndpoint::parse_list("ok:9092,bad:port").is_err());
    }
}
