
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::addr::*;
use crate::attributes::*;
use crate::checks::*;
use crate::error::*;
use crate::message::*;

/// xor_bytes sets dst[i] = a[i] ^ b[i] for i up to the shortest of the
/// three slices and returns the number of bytes xor'd.
///
/// The plain byte-wise loop is used on all targets; word-at-a-time
/// specializations must produce identical results.
pub fn xor_bytes(dst: &mut [u8], a: &[u8], b: &[u8]) -> usize {
    let n = a.len().min(b.len()).min(dst.len());
    for i in 0..n {
        dst[i] = a[i] ^ b[i];
    }
    n
}

/// XorMappedAddress implements XOR-MAPPED-ADDRESS attribute.
///
/// RFC 5389 Section 15.2
pub struct XorMappedAddress {
    pub ip: IpAddr,
    pub port: u16,
}

impl Default for XorMappedAddress {
    fn default() -> Self {
        XorMappedAddress {
            ip: IpAddr::V4(Ipv4Addr::from(0)),
            port: 0,
        }
    }
}

impl fmt::Display for XorMappedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ip {
            IpAddr::V4(_) => write!(f, "{}:{}", self.ip, self.port),
            IpAddr::V6(_) => write!(f, "[{}]:{}", self.ip, self.port),
        }
    }
}

impl Setter for XorMappedAddress {
    /// add_to adds XOR-MAPPED-ADDRESS to m.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        self.add_to_as(m, ATTR_XORMAPPED_ADDRESS)
    }
}

impl Getter for XorMappedAddress {
    /// get_from decodes XOR-MAPPED-ADDRESS attribute in message and
    /// returns error if any.
    fn get_from(&mut self, m: &Message) -> Result<()> {
        self.get_from_as(m, ATTR_XORMAPPED_ADDRESS)
    }
}

impl XorMappedAddress {
    /// add_to_as adds the XOR'd address value to m as a t attribute.
    ///
    /// The port is XOR'd with the 16 most significant bits of the magic
    /// cookie; the address is XOR'd byte-wise with cookie || transaction id
    /// (only the first 4 key bytes for IPv4).
    pub fn add_to_as(&self, m: &mut Message, t: AttrType) -> Result<()> {
        let mut xor_key = [0u8; 4 + TRANSACTION_ID_SIZE];
        xor_key[..4].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
        xor_key[4..].copy_from_slice(&m.transaction_id.0);

        let mut value = [0u8; 4 + IPV6LEN];
        let ip_len = match self.ip {
            IpAddr::V4(ipv4) => {
                value[..2].copy_from_slice(&FAMILY_IPV4.to_be_bytes());
                xor_bytes(&mut value[4..4 + IPV4LEN], &ipv4.octets(), &xor_key);
                IPV4LEN
            }
            IpAddr::V6(ipv6) => {
                value[..2].copy_from_slice(&FAMILY_IPV6.to_be_bytes());
                xor_bytes(&mut value[4..4 + IPV6LEN], &ipv6.octets(), &xor_key);
                IPV6LEN
            }
        };
        value[2..4]
            .copy_from_slice(&(self.port ^ (MAGIC_COOKIE >> 16) as u16).to_be_bytes());

        m.add(t, &value[..4 + ip_len]);
        Ok(())
    }

    /// get_from_as decodes the XOR'd address value in message m stored as
    /// an attribute of type t.
    pub fn get_from_as(&mut self, m: &Message, t: AttrType) -> Result<()> {
        let v = m.get(t)?;
        if v.len() <= 4 {
            return Err(Error::ErrUnexpectedEof);
        }

        let family = u16::from_be_bytes([v[0], v[1]]);
        if family != FAMILY_IPV6 && family != FAMILY_IPV4 {
            return Err(Error::ErrBadFamily);
        }

        check_overflow(
            t,
            v[4..].len(),
            if family == FAMILY_IPV4 {
                IPV4LEN
            } else {
                IPV6LEN
            },
        )?;

        self.port = u16::from_be_bytes([v[2], v[3]]) ^ (MAGIC_COOKIE >> 16) as u16;

        let mut xor_key = [0u8; 4 + TRANSACTION_ID_SIZE];
        xor_key[..4].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
        xor_key[4..].copy_from_slice(&m.transaction_id.0);

        if family == FAMILY_IPV6 {
            let mut ip = [0; IPV6LEN];
            xor_bytes(&mut ip, &v[4..], &xor_key);
            self.ip = IpAddr::V6(Ipv6Addr::from(ip));
        } else {
            let mut ip = [0; IPV4LEN];
            xor_bytes(&mut ip, &v[4..], &xor_key);
            self.ip = IpAddr::V4(Ipv4Addr::from(ip));
        };

        Ok(())
    }
}

/// XorPeerAddress implements XOR-PEER-ADDRESS attribute.
///
/// RFC 5766 Section 14.3
pub struct XorPeerAddress(pub XorMappedAddress);

impl Setter for XorPeerAddress {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        self.0.add_to_as(m, ATTR_XOR_PEER_ADDRESS)
    }
}

impl Getter for XorPeerAddress {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        self.0.get_from_as(m, ATTR_XOR_PEER_ADDRESS)
    }
}

/// XorRelayedAddress implements XOR-RELAYED-ADDRESS attribute.
///
/// RFC 5766 Section 14.5
pub struct XorRelayedAddress(pub XorMappedAddress);

impl Setter for XorRelayedAddress {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        self.0.add_to_as(m, ATTR_XOR_RELAYED_ADDRESS)
    }
}

impl Getter for XorRelayedAddress {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        self.0.get_from_as(m, ATTR_XOR_RELAYED_ADDRESS)
    }
}
