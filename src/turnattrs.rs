#[cfg(test)]
mod turnattrs_test;

use std::fmt;
use std::time::Duration;

use crate::attributes::*;
use crate::checks::*;
use crate::error::*;
use crate::message::*;

const CHANNEL_NUMBER_SIZE: usize = 4; // 16 bit number + RFFU
const LIFETIME_SIZE: usize = 4; // 32 bit
const EVEN_PORT_SIZE: usize = 1;
const REQUESTED_TRANSPORT_SIZE: usize = 4; // protocol + RFFU
const RESERVATION_TOKEN_SIZE: usize = 8; // 64 bit

/// ChannelNumber represents CHANNEL-NUMBER attribute.
///
/// The 16-bit channel number is followed by two RFFU bytes that must be
/// zero on the wire.
///
/// RFC 5766 Section 14.1
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
pub struct ChannelNumber(pub u16);

impl fmt::Display for ChannelNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CN 0x{:x}", self.0)
    }
}

impl Setter for ChannelNumber {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        let mut v = [0u8; CHANNEL_NUMBER_SIZE];
        v[..2].copy_from_slice(&self.0.to_be_bytes());
        // v[2..4] is RFFU, zero.
        m.add(ATTR_CHANNEL_NUMBER, &v);
        Ok(())
    }
}

impl Getter for ChannelNumber {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let v = m.get(ATTR_CHANNEL_NUMBER)?;
        check_size(ATTR_CHANNEL_NUMBER, v.len(), CHANNEL_NUMBER_SIZE)?;
        self.0 = u16::from_be_bytes([v[0], v[1]]);
        Ok(())
    }
}

/// Lifetime represents LIFETIME attribute: the duration for which the
/// server maintains an allocation, in seconds.
///
/// RFC 5766 Section 14.2
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
pub struct Lifetime(pub Duration);

impl fmt::Display for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0.as_secs())
    }
}

impl Setter for Lifetime {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        m.add(ATTR_LIFETIME, &(self.0.as_secs() as u32).to_be_bytes());
        Ok(())
    }
}

impl Getter for Lifetime {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let v = m.get(ATTR_LIFETIME)?;
        check_size(ATTR_LIFETIME, v.len(), LIFETIME_SIZE)?;
        let seconds = u32::from_be_bytes([v[0], v[1], v[2], v[3]]);
        self.0 = Duration::from_secs(seconds as u64);
        Ok(())
    }
}

/// Data represents DATA attribute: the raw application payload of a Send
/// or Data indication.
///
/// RFC 5766 Section 14.4
#[derive(Default, PartialEq, Eq, Debug, Clone)]
pub struct Data(pub Vec<u8>);

impl Setter for Data {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        m.add(ATTR_DATA, &self.0);
        Ok(())
    }
}

impl Getter for Data {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        self.0 = m.get(ATTR_DATA)?.to_vec();
        Ok(())
    }
}

const EVEN_PORT_RESERVE_BIT: u8 = 0x80; // R bit

/// EvenPort represents EVEN-PORT attribute: request an even relayed port,
/// optionally reserving the next one.
///
/// RFC 5766 Section 14.6
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
pub struct EvenPort {
    /// reserve_additional means "reserve the next higher port number".
    pub reserve_additional: bool,
}

impl Setter for EvenPort {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        let v = if self.reserve_additional {
            [EVEN_PORT_RESERVE_BIT]
        } else {
            [0u8]
        };
        m.add(ATTR_EVEN_PORT, &v);
        Ok(())
    }
}

impl Getter for EvenPort {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let v = m.get(ATTR_EVEN_PORT)?;
        check_size(ATTR_EVEN_PORT, v.len(), EVEN_PORT_SIZE)?;
        self.reserve_additional = v[0] & EVEN_PORT_RESERVE_BIT != 0;
        Ok(())
    }
}

/// Protocol is IANA assigned protocol number.
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
pub struct Protocol(pub u8);

/// PROTO_UDP is IANA assigned protocol number for UDP.
pub const PROTO_UDP: Protocol = Protocol(17);
/// PROTO_TCP is IANA assigned protocol number for TCP.
pub const PROTO_TCP: Protocol = Protocol(6);

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let other = format!("{}", self.0);
        let s = match *self {
            PROTO_UDP => "UDP",
            PROTO_TCP => "TCP",
            _ => other.as_str(),
        };
        write!(f, "{s}")
    }
}

/// RequestedTransport represents REQUESTED-TRANSPORT attribute: the
/// protocol byte followed by three RFFU bytes.
///
/// RFC 5766 Section 14.7
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
pub struct RequestedTransport {
    pub protocol: Protocol,
}

impl fmt::Display for RequestedTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "protocol: {}", self.protocol)
    }
}

impl Setter for RequestedTransport {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        let mut v = [0u8; REQUESTED_TRANSPORT_SIZE];
        v[0] = self.protocol.0;
        // v[1..4] is RFFU, zero.
        m.add(ATTR_REQUESTED_TRANSPORT, &v);
        Ok(())
    }
}

impl Getter for RequestedTransport {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let v = m.get(ATTR_REQUESTED_TRANSPORT)?;
        check_size(ATTR_REQUESTED_TRANSPORT, v.len(), REQUESTED_TRANSPORT_SIZE)?;
        self.protocol = Protocol(v[0]);
        Ok(())
    }
}

/// DontFragmentAttr represents DONT-FRAGMENT attribute: a flag with no
/// value.
///
/// RFC 5766 Section 14.8
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
pub struct DontFragmentAttr;

impl Setter for DontFragmentAttr {
    /// add_to adds DONT-FRAGMENT attribute to message.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        m.add(ATTR_DONT_FRAGMENT, &[]);
        Ok(())
    }
}

impl DontFragmentAttr {
    /// is_set returns true if DONT-FRAGMENT attribute is present.
    #[must_use]
    pub fn is_set(m: &Message) -> bool {
        m.get(ATTR_DONT_FRAGMENT).is_ok()
    }
}

/// ReservationToken represents RESERVATION-TOKEN attribute: an 8-byte
/// token identifying a reserved relayed transport address.
///
/// RFC 5766 Section 14.9
#[derive(Default, PartialEq, Eq, Debug, Clone)]
pub struct ReservationToken(pub Vec<u8>);

impl Setter for ReservationToken {
    fn add_to(&self, m: &mut Message) -> Result<()> {
        check_size(ATTR_RESERVATION_TOKEN, self.0.len(), RESERVATION_TOKEN_SIZE)?;
        m.add(ATTR_RESERVATION_TOKEN, &self.0);
        Ok(())
    }
}

impl Getter for ReservationToken {
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let v = m.get(ATTR_RESERVATION_TOKEN)?;
        check_size(ATTR_RESERVATION_TOKEN, v.len(), RESERVATION_TOKEN_SIZE)?;
        self.0 = v.to_vec();
        Ok(())
    }
}
