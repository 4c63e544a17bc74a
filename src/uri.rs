
use std::borrow::Cow;
use std::fmt;

use crate::error::*;

/// DEFAULT_PORT is used when a stun: or turn: URI carries no port.
pub const DEFAULT_PORT: u16 = 3478;
/// DEFAULT_TLS_PORT is used when a stuns: or turns: URI carries no port.
pub const DEFAULT_TLS_PORT: u16 = 5349;

/// SchemeType is the scheme of a STUN (RFC 7064) or TURN (RFC 7065) URI.
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
pub enum SchemeType {
    Stun,
    Stuns,
    Turn,
    Turns,
    #[default]
    Unknown,
}

impl From<&str> for SchemeType {
    fn from(raw: &str) -> Self {
        match raw {
            "stun" => Self::Stun,
            "stuns" => Self::Stuns,
            "turn" => Self::Turn,
            "turns" => Self::Turns,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for SchemeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            SchemeType::Stun => "stun",
            SchemeType::Stuns => "stuns",
            SchemeType::Turn => "turn",
            SchemeType::Turns => "turns",
            SchemeType::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// ProtoType is the transport protocol a TURN URI selects via its
/// `transport` query parameter.
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
pub enum ProtoType {
    #[default]
    Udp,
    Tcp,
    Unknown,
}

impl From<&str> for ProtoType {
    fn from(raw: &str) -> Self {
        match raw {
            "udp" => Self::Udp,
            "tcp" => Self::Tcp,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for ProtoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            Self::Udp => "udp",
            Self::Tcp => "tcp",
            Self::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

/// Uri is a parsed STUN or TURN URI.
///
/// Ports and transports that the URI does not spell out are defaulted:
/// port 3478 (plain) or 5349 (TLS), transport UDP for `stun:`/`turn:` and
/// TCP for `stuns:`/`turns:`.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Uri {
    pub scheme: SchemeType,
    pub host: String,
    pub port: u16,
    pub proto: ProtoType,
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let host = if self.host.contains("::") {
            "[".to_owned() + self.host.as_str() + "]"
        } else {
            self.host.clone()
        };

        if self.scheme == SchemeType::Turn || self.scheme == SchemeType::Turns {
            write!(
                f,
                "{}:{}:{}?transport={}",
                self.scheme, host, self.port, self.proto
            )
        } else {
            write!(f, "{}:{}:{}", self.scheme, host, self.port)
        }
    }
}

impl Uri {
    /// parse parses a URI following the ABNF syntax described in RFC 7064
    /// (stun, stuns) and RFC 7065 (turn, turns). STUN URIs must not carry
    /// a query; TURN URIs accept only `transport=udp|tcp`.
    pub fn parse(raw: &str) -> Result<Self> {
        // These URIs are opaque, not hierarchical; refuse an authority
        // part outright, then rewrite the scheme separator so the url
        // crate parses host/port/query for us.
        if raw.contains("//") {
            return Err(Error::ErrInvalidUrl);
        }

        let mut s = raw.to_string();
        let pos = raw.find(':');
        if let Some(p) = pos {
            s.replace_range(p..=p, "://");
        } else {
            return Err(Error::ErrSchemeType);
        }

        let raw_parts = url::Url::parse(&s)?;

        let scheme = SchemeType::from(raw_parts.scheme());
        if scheme == SchemeType::Unknown {
            return Err(Error::ErrSchemeType);
        }

        let host = if let Some(host) = raw_parts.host_str() {
            host.trim()
                .trim_start_matches('[')
                .trim_end_matches(']')
                .to_owned()
        } else {
            return Err(Error::ErrHost);
        };

        let port = if let Some(port) = raw_parts.port() {
            port
        } else if scheme == SchemeType::Stun || scheme == SchemeType::Turn {
            DEFAULT_PORT
        } else {
            DEFAULT_TLS_PORT
        };

        let mut q_args = raw_parts.query_pairs();
        let proto = match scheme {
            SchemeType::Stun | SchemeType::Stuns => {
                if q_args.count() > 0 {
                    return Err(Error::ErrStunQuery);
                }
                if scheme == SchemeType::Stun {
                    ProtoType::Udp
                } else {
                    ProtoType::Tcp
                }
            }
            SchemeType::Turn | SchemeType::Turns => {
                if q_args.count() > 1 {
                    return Err(Error::ErrInvalidQuery);
                }
                if let Some((key, value)) = q_args.next() {
                    if key != Cow::Borrowed("transport") {
                        return Err(Error::ErrInvalidQuery);
                    }
                    let proto = ProtoType::from(value.as_ref());
                    if proto == ProtoType::Unknown {
                        return Err(Error::ErrProtoType);
                    }
                    proto
                } else if scheme == SchemeType::Turn {
                    ProtoType::Udp
                } else {
                    ProtoType::Tcp
                }
            }
            SchemeType::Unknown => return Err(Error::ErrSchemeType),
        };

        Ok(Uri {
            scheme,
            host,
            port,
            proto,
        })
    }

    /// is_secure returns true for stuns: and turns: URIs.
    pub fn is_secure(&self) -> bool {
        self.scheme == SchemeType::Stuns || self.scheme == SchemeType::Turns
    }
}
