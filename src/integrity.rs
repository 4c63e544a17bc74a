
use std::fmt;

use md5::{Digest, Md5};
use ring::hmac;

use crate::attributes::*;
use crate::checks::*;
use crate::error::*;
use crate::message::*;

// separator for credentials.
pub(crate) const CREDENTIALS_SEP: &str = ":";

pub(crate) const MESSAGE_INTEGRITY_SIZE: usize = 20;

fn new_hmac(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mac = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, key);
    hmac::sign(&mac, message).as_ref().to_vec()
}

// MessageIntegrity represents MESSAGE-INTEGRITY attribute: an HMAC-SHA1
// keyed by short-term or long-term credentials.
//
// The wrapped bytes are the key. Credential strings must already be
// SASL-prepared by the caller.
//
// RFC 5389 Section 15.4
#[derive(Default, Clone)]
pub struct MessageIntegrity(pub Vec<u8>);

impl fmt::Display for MessageIntegrity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KEY: 0x{:x?}", self.0)
    }
}

impl Setter for MessageIntegrity {
    // add_to adds MESSAGE-INTEGRITY attribute to message.
    //
    // The HMAC covers the message with the header length field already
    // counting the integrity TLV that is about to be appended.
    //
    // CPU costly, as it computes the HMAC over the whole message.
    fn add_to(&self, m: &mut Message) -> Result<()> {
        // A message must not contain a FINGERPRINT attribute before
        // MESSAGE-INTEGRITY.
        if m.contains(ATTR_FINGERPRINT) {
            return Err(Error::ErrFingerprintBeforeIntegrity);
        }
        // The text used as input to HMAC is the STUN message,
        // including the header, up to and including the attribute preceding
        // the MESSAGE-INTEGRITY attribute.
        let length = m.length;
        // Adjusting m.length to contain MESSAGE-INTEGRITY TLV.
        m.length += (MESSAGE_INTEGRITY_SIZE + ATTRIBUTE_HEADER_SIZE) as u32;
        m.write_length(); // writing length to m.raw
        let v = new_hmac(&self.0, &m.raw); // calculating HMAC for adjusted m.raw
        m.length = length; // changing m.length back

        m.add(ATTR_MESSAGE_INTEGRITY, &v);

        Ok(())
    }
}

impl MessageIntegrity {
    // new_long_term_integrity returns a MessageIntegrity keyed for
    // long-term credentials: MD5(username ":" realm ":" password).
    pub fn new_long_term_integrity(username: String, realm: String, password: String) -> Self {
        let s = [username, realm, password].join(CREDENTIALS_SEP);

        let mut h = Md5::new();
        h.update(s.as_bytes());

        MessageIntegrity(h.finalize().as_slice().to_vec())
    }

    // new_short_term_integrity returns a MessageIntegrity keyed for
    // short-term credentials: the password bytes.
    pub fn new_short_term_integrity(password: String) -> Self {
        MessageIntegrity(password.into_bytes())
    }

    // check verifies the MESSAGE-INTEGRITY attribute.
    //
    // Attributes placed after MESSAGE-INTEGRITY (commonly FINGERPRINT) are
    // excluded: the header length is temporarily reduced by their total
    // TLV size, the HMAC is recomputed over the prefix ending where the
    // integrity attribute starts, and the length is restored afterwards.
    // The comparison is constant-time.
    pub fn check(&self, m: &mut Message) -> Result<()> {
        let mut v = [0u8; MESSAGE_INTEGRITY_SIZE];
        {
            let got = m.get(ATTR_MESSAGE_INTEGRITY)?;
            check_size(ATTR_MESSAGE_INTEGRITY, got.len(), MESSAGE_INTEGRITY_SIZE)?;
            v.copy_from_slice(got);
        }

        // Adjusting the length in the header to match the raw that was
        // used when computing the HMAC.
        let length = m.length;
        let mut after_integrity = false;
        let mut size_reduced = 0u32;

        for a in &m.attributes.0 {
            if after_integrity {
                size_reduced += nearest_padded_value_length(a.length as usize) as u32;
                size_reduced += ATTRIBUTE_HEADER_SIZE as u32;
            }
            if a.typ == ATTR_MESSAGE_INTEGRITY {
                after_integrity = true;
            }
        }
        m.length -= size_reduced;
        m.write_length();
        // start_of_hmac is the first byte of the integrity attribute's TLV.
        let start_of_hmac = MESSAGE_HEADER_SIZE + m.length as usize
            - (ATTRIBUTE_HEADER_SIZE + MESSAGE_INTEGRITY_SIZE);
        let expected = new_hmac(&self.0, &m.raw[..start_of_hmac]);
        m.length = length;
        m.write_length(); // writing length back
        check_hmac(&v, &expected)
    }
}
