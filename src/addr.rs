
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::attributes::*;
use crate::error::*;
use crate::message::*;

pub(crate) const FAMILY_IPV4: u16 = 0x01;
pub(crate) const FAMILY_IPV6: u16 = 0x02;
pub(crate) const IPV4LEN: usize = 4;
pub(crate) const IPV6LEN: usize = 16;

/// MappedAddress represents MAPPED-ADDRESS attribute.
///
/// This attribute is used only by servers for achieving backwards
/// compatibility with RFC 3489 clients.
///
/// RFC 5389 Section 15.1
pub struct MappedAddress {
    pub ip: IpAddr,
    pub port: u16,
}

impl fmt::Display for MappedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ip {
            IpAddr::V4(_) => write!(f, "{}:{}", self.ip, self.port),
            IpAddr::V6(_) => write!(f, "[{}]:{}", self.ip, self.port),
        }
    }
}

impl Default for MappedAddress {
    fn default() -> Self {
        MappedAddress {
            ip: IpAddr::V4(Ipv4Addr::from(0)),
            port: 0,
        }
    }
}

impl Setter for MappedAddress {
    /// add_to adds MAPPED-ADDRESS to message.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        self.add_to_as(m, ATTR_MAPPED_ADDRESS)
    }
}

impl Getter for MappedAddress {
    /// get_from decodes MAPPED-ADDRESS from message.
    fn get_from(&mut self, m: &Message) -> Result<()> {
        self.get_from_as(m, ATTR_MAPPED_ADDRESS)
    }
}

impl MappedAddress {
    /// get_from_as decodes an address value in message m stored as an
    /// attribute of type t.
    ///
    /// Wire layout is one reserved zero byte, family byte, port (u16-be)
    /// and 4 or 16 address bytes. Short address fields read from the wire
    /// are tolerated and zero-filled.
    pub fn get_from_as(&mut self, m: &Message, t: AttrType) -> Result<()> {
        let v = m.get(t)?;
        if v.len() <= 4 {
            return Err(Error::ErrUnexpectedEof);
        }

        let family = u16::from_be_bytes([v[0], v[1]]);
        if family != FAMILY_IPV6 && family != FAMILY_IPV4 {
            return Err(Error::ErrBadFamily);
        }
        self.port = u16::from_be_bytes([v[2], v[3]]);

        if family == FAMILY_IPV6 {
            let mut ip = [0; IPV6LEN];
            let l = std::cmp::min(ip.len(), v[4..].len());
            ip[..l].copy_from_slice(&v[4..4 + l]);
            self.ip = IpAddr::V6(Ipv6Addr::from(ip));
        } else {
            let mut ip = [0; IPV4LEN];
            let l = std::cmp::min(ip.len(), v[4..].len());
            ip[..l].copy_from_slice(&v[4..4 + l]);
            self.ip = IpAddr::V4(Ipv4Addr::from(ip));
        };

        Ok(())
    }

    /// add_to_as adds the address value to m as a t attribute.
    pub fn add_to_as(&self, m: &mut Message, t: AttrType) -> Result<()> {
        let mut value = [0u8; 4 + IPV6LEN];
        let ip_len = match self.ip {
            IpAddr::V4(ipv4) => {
                value[..2].copy_from_slice(&FAMILY_IPV4.to_be_bytes());
                value[4..4 + IPV4LEN].copy_from_slice(&ipv4.octets());
                IPV4LEN
            }
            IpAddr::V6(ipv6) => {
                value[..2].copy_from_slice(&FAMILY_IPV6.to_be_bytes());
                value[4..4 + IPV6LEN].copy_from_slice(&ipv6.octets());
                IPV6LEN
            }
        };
        value[2..4].copy_from_slice(&self.port.to_be_bytes());

        m.add(t, &value[..4 + ip_len]);
        Ok(())
    }
}

/// AlternateServer represents ALTERNATE-SERVER attribute.
///
/// RFC 5389 Section 15.11
pub type AlternateServer = MappedAddress;

/// ResponseOrigin represents RESPONSE-ORIGIN attribute.
///
/// RFC 5780 Section 7.3
pub type ResponseOrigin = MappedAddress;

/// OtherAddress represents OTHER-ADDRESS attribute.
///
/// RFC 5780 Section 7.4
pub type OtherAddress = MappedAddress;

impl AlternateServer {
    /// add_alternate_server adds ALTERNATE-SERVER to message.
    pub fn add_alternate_server(&self, m: &mut Message) -> Result<()> {
        self.add_to_as(m, ATTR_ALTERNATE_SERVER)
    }

    /// get_alternate_server decodes ALTERNATE-SERVER from message.
    pub fn get_alternate_server(&mut self, m: &Message) -> Result<()> {
        self.get_from_as(m, ATTR_ALTERNATE_SERVER)
    }

    /// add_response_origin adds RESPONSE-ORIGIN to message.
    pub fn add_response_origin(&self, m: &mut Message) -> Result<()> {
        self.add_to_as(m, ATTR_RESPONSE_ORIGIN)
    }

    /// get_response_origin decodes RESPONSE-ORIGIN from message.
    pub fn get_response_origin(&mut self, m: &Message) -> Result<()> {
        self.get_from_as(m, ATTR_RESPONSE_ORIGIN)
    }

    /// add_other_address adds OTHER-ADDRESS to message.
    pub fn add_other_address(&self, m: &mut Message) -> Result<()> {
        self.add_to_as(m, ATTR_OTHER_ADDRESS)
    }

    /// get_other_address decodes OTHER-ADDRESS from message.
    pub fn get_other_address(&mut self, m: &Message) -> Result<()> {
        self.get_from_as(m, ATTR_OTHER_ADDRESS)
    }
}
