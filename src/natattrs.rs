#[cfg(test)]
mod natattrs_test;

use crate::attributes::*;
use crate::checks::*;
use crate::error::*;
use crate::message::*;

const CHANGE_REQUEST_SIZE: usize = 4;

const CHANGE_IP_BIT: u8 = 0x04;
const CHANGE_PORT_BIT: u8 = 0x02;

/// ChangeRequest represents CHANGE-REQUEST attribute used in NAT behavior
/// discovery: the last value byte carries the "change IP" (bit 2) and
/// "change port" (bit 1) flags.
///
/// RFC 5780 Section 7.2
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
pub struct ChangeRequest {
    pub change_ip: bool,
    pub change_port: bool,
}

impl Setter for ChangeRequest {
    /// add_to adds CHANGE-REQUEST to message.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        let mut v = [0u8; CHANGE_REQUEST_SIZE];
        if self.change_ip {
            v[3] |= CHANGE_IP_BIT;
        }
        if self.change_port {
            v[3] |= CHANGE_PORT_BIT;
        }
        m.add(ATTR_CHANGE_REQUEST, &v);
        Ok(())
    }
}

impl Getter for ChangeRequest {
    /// get_from decodes CHANGE-REQUEST from message.
    fn get_from(&mut self, m: &Message) -> Result<()> {
        let v = m.get(ATTR_CHANGE_REQUEST)?;
        check_size(ATTR_CHANGE_REQUEST, v.len(), CHANGE_REQUEST_SIZE)?;
        self.change_ip = v[3] & CHANGE_IP_BIT != 0;
        self.change_port = v[3] & CHANGE_PORT_BIT != 0;
        Ok(())
    }
}
