use super::*;
use crate::attributes::*;
use crate::fingerprint::FINGERPRINT;
use crate::iceattrs::{AttrControlled, PriorityAttr};
use crate::integrity::MessageIntegrity;
use crate::textattrs::TextAttribute;

// Sample request from RFC 5769 Section 2.1.
fn rfc5769_request() -> Vec<u8> {
    let mut raw = vec![
        0x00, 0x01, 0x00, 0x58, // request type and message length
        0x21, 0x12, 0xa4, 0x42, // magic cookie
        0xb7, 0xe7, 0xa7, 0x01, // }
        0xbc, 0x34, 0xd6, 0x86, // } transaction ID
        0xfa, 0x87, 0xdf, 0xae, // }
        0x80, 0x22, 0x00, 0x10, // SOFTWARE attribute header
    ];
    raw.extend_from_slice(b"STUN test client");
    raw.extend_from_slice(&[
        0x00, 0x24, 0x00, 0x04, // PRIORITY attribute header
        0x6e, 0x00, 0x01, 0xff, // ICE priority value
        0x80, 0x29, 0x00, 0x08, // ICE-CONTROLLED attribute header
        0x93, 0x2f, 0xf9, 0xb1, // } pseudo-random tie breaker
        0x51, 0x26, 0x3b, 0x36, // }
        0x00, 0x06, 0x00, 0x09, // USERNAME attribute header
        0x65, 0x76, 0x74, 0x6a, // }
        0x3a, 0x68, 0x36, 0x76, // } username "evtj:h6vY" (9 bytes, 3 padding)
        0x59, 0x20, 0x20, 0x20, // }
        0x00, 0x08, 0x00, 0x14, // MESSAGE-INTEGRITY attribute header
        0x9a, 0xea, 0xa7, 0x0c, // }
        0xbf, 0xd8, 0xcb, 0x56, // }
        0x78, 0x1e, 0xf2, 0xb5, // } HMAC-SHA1 fingerprint
        0xb2, 0xd3, 0xf2, 0x49, // }
        0xc1, 0xb5, 0x71, 0xa2, // }
        0x80, 0x28, 0x00, 0x04, // FINGERPRINT attribute header
        0xe5, 0x7a, 0x3b, 0xcf, // CRC32 fingerprint
    ]);
    raw
}

#[test]
fn test_rfc5769_sample_request() -> Result<()> {
    let mut m = Message::new();
    m.write(&rfc5769_request())?;

    assert_eq!(m.typ, BINDING_REQUEST);
    assert_eq!(
        m.transaction_id.0,
        [0xb7, 0xe7, 0xa7, 0x01, 0xbc, 0x34, 0xd6, 0x86, 0xfa, 0x87, 0xdf, 0xae]
    );

    let software = TextAttribute::get_from_as(&m, ATTR_SOFTWARE)?;
    assert_eq!(software.text, "STUN test client");

    let username = TextAttribute::get_from_as(&m, ATTR_USERNAME)?;
    assert_eq!(username.text, "evtj:h6vY");

    let mut priority = PriorityAttr::default();
    priority.get_from(&m)?;
    assert_eq!(priority.0, 0x6e0001ff);

    let mut controlled = AttrControlled::default();
    controlled.get_from(&m)?;
    assert_eq!(controlled.0, 0x932f_f9b1_5126_3b36);

    FINGERPRINT.check(&m)?;

    let i = MessageIntegrity::new_short_term_integrity("VOkJxbRl1RmTxUk/WvJxBt".to_owned());
    i.check(&mut m)?;

    Ok(())
}

#[test]
fn test_message_type_value() {
    let tests = vec![
        (
            MessageType::new(METHOD_BINDING, CLASS_REQUEST),
            0x0001u16,
        ),
        (
            MessageType::new(METHOD_BINDING, CLASS_SUCCESS_RESPONSE),
            0x0101,
        ),
        (
            MessageType::new(METHOD_BINDING, CLASS_ERROR_RESPONSE),
            0x0111,
        ),
        (MessageType::new(METHOD_ALLOCATE, CLASS_REQUEST), 0x0003),
        (
            MessageType::new(METHOD_CREATE_PERMISSION, CLASS_REQUEST),
            0x0008,
        ),
        (MessageType::new(METHOD_CHANNEL_BIND, CLASS_REQUEST), 0x0009),
    ];
    for (t, expected) in tests {
        assert_eq!(t.value(), expected, "{t}: 0x{:x} != 0x{expected:x}", t.value());
    }
}

#[test]
fn test_message_type_read_value_roundtrip() {
    let methods = [
        METHOD_BINDING,
        METHOD_ALLOCATE,
        METHOD_REFRESH,
        METHOD_SEND,
        METHOD_DATA,
        METHOD_CREATE_PERMISSION,
        METHOD_CHANNEL_BIND,
    ];
    let classes = [
        CLASS_REQUEST,
        CLASS_INDICATION,
        CLASS_SUCCESS_RESPONSE,
        CLASS_ERROR_RESPONSE,
    ];

    for method in methods {
        for class in classes {
            let t = MessageType::new(method, class);
            let mut got = MessageType::default();
            got.read_value(t.value());
            assert_eq!(got, t, "{got} != {t}");
        }
    }
}

#[test]
fn test_is_message() {
    let m = {
        let mut m = Message::new();
        m.write_header();
        m
    };
    assert!(is_message(&m.raw));

    // Cookie alone decides; structural validity is not required.
    let mut garbage = vec![0xffu8; 24];
    garbage[4..8].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
    assert!(is_message(&garbage));

    garbage[4] = 0;
    assert!(!is_message(&garbage));
    assert!(!is_message(&[0u8; 19])); // short
    assert!(!is_message(&[]));
}

#[test]
fn test_message_build_decode_roundtrip() -> Result<()> {
    let mut m = Message::new();
    m.build(&[
        Box::new(BINDING_REQUEST),
        Box::new(TransactionId::new()),
        Box::new(TextAttribute::new(ATTR_SOFTWARE, "test".to_owned())),
        Box::new(PriorityAttr(0x1234_5678)),
    ])?;

    assert_eq!(&m.raw[4..8], &MAGIC_COOKIE.to_be_bytes());

    let mut decoded = Message::new();
    decoded.write(&m.raw)?;
    assert_eq!(decoded, m, "{decoded} != {m}");

    Ok(())
}

#[test]
fn test_message_add_padding() -> Result<()> {
    let mut m = Message::new();
    m.write_header();
    m.add(ATTR_SOFTWARE, b"123456789"); // 9 bytes, 3 bytes padding

    assert_eq!(m.length, 4 + 9 + 3);
    assert_eq!(m.raw.len(), MESSAGE_HEADER_SIZE + 16);
    assert_eq!(&m.raw[m.raw.len() - 3..], &[0, 0, 0]);

    let a = m.attributes.get(ATTR_SOFTWARE).unwrap();
    assert_eq!(a.length, 9);
    assert_eq!(m.attr_value(a), b"123456789");
    assert_eq!(m.get(ATTR_SOFTWARE)?, b"123456789");

    Ok(())
}

#[test]
fn test_message_attribute_descriptors() -> Result<()> {
    let mut m = Message::new();
    m.write_header();
    m.add(ATTR_USERNAME, b"user");
    m.add(ATTR_NONCE, b"nonce");

    let mut decoded = Message::new();
    decoded.write(&m.raw)?;

    let mut consumed = 0;
    for a in &decoded.attributes.0 {
        assert_eq!(decoded.attr_value(a).len(), a.length as usize);
        consumed += ATTRIBUTE_HEADER_SIZE + nearest_padded_value_length(a.length as usize);
    }
    assert_eq!(consumed, decoded.length as usize);

    Ok(())
}

#[test]
fn test_message_get_not_found() {
    let mut m = Message::new();
    m.write_header();
    assert_eq!(m.get(ATTR_REALM), Err(Error::ErrAttributeNotFound));
    assert!(!m.contains(ATTR_REALM));
}

#[test]
fn test_message_decode_errors() {
    let mut m = Message::new();

    // Header EOF.
    let result = m.write(&[0u8; 12]);
    assert_eq!(result, Err(Error::ErrUnexpectedHeaderEof));

    // Bad cookie.
    let mut raw = vec![0u8; 20];
    raw[4..8].copy_from_slice(&0xdead_beefu32.to_be_bytes());
    assert_eq!(m.write(&raw), Err(Error::ErrBadMagicCookie));

    // Declared size exceeds the buffer.
    let mut raw = vec![0u8; 20];
    raw[3] = 4;
    raw[4..8].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
    assert_eq!(m.write(&raw), Err(Error::ErrBadMessageLength));

    // Attribute header EOF: 2 stray bytes where a TLV header should be.
    let mut raw = vec![0u8; 22];
    raw[3] = 2;
    raw[4..8].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
    assert_eq!(m.write(&raw), Err(Error::ErrAttributeHeaderEof));

    // Attribute value EOF: declared value longer than the remainder.
    let mut raw = vec![0u8; 28];
    raw[3] = 8;
    raw[4..8].copy_from_slice(&MAGIC_COOKIE.to_be_bytes());
    raw[20..22].copy_from_slice(&ATTR_SOFTWARE.value().to_be_bytes());
    raw[22..24].copy_from_slice(&16u16.to_be_bytes());
    assert_eq!(m.write(&raw), Err(Error::ErrAttributeValueEof));
}

#[test]
fn test_message_clone_to() -> Result<()> {
    let mut m = Message::new();
    m.build(&[
        Box::new(BINDING_REQUEST),
        Box::new(TransactionId::new()),
        Box::new(TextAttribute::new(ATTR_SOFTWARE, "original".to_owned())),
    ])?;

    let mut b = Message::new();
    m.clone_to(&mut b)?;
    assert_eq!(b, m);

    // Further mutations of m must not show through b.
    m.build(&[
        Box::new(BINDING_ERROR),
        Box::new(TransactionId::new()),
    ])?;
    let software = TextAttribute::get_from_as(&b, ATTR_SOFTWARE)?;
    assert_eq!(software.text, "original");

    Ok(())
}

#[test]
fn test_message_reset_reuse() -> Result<()> {
    let mut m = Message::new();
    m.build(&[
        Box::new(BINDING_REQUEST),
        Box::new(TransactionId::new()),
        Box::new(TextAttribute::new(ATTR_SOFTWARE, "one".to_owned())),
    ])?;
    let first_id = m.transaction_id;

    m.build(&[
        Box::new(BINDING_SUCCESS),
        Box::new(TransactionId::new()),
    ])?;
    assert_eq!(m.typ, BINDING_SUCCESS);
    assert_ne!(m.transaction_id, first_id);
    assert!(m.attributes.0.is_empty());
    assert_eq!(m.length, 0);

    Ok(())
}

#[test]
fn test_message_setter_copies_transaction_id() -> Result<()> {
    let mut req = Message::new();
    req.build(&[Box::new(BINDING_REQUEST), Box::new(TransactionId::new())])?;

    let mut resp = Message::new();
    resp.build(&[Box::new(req.clone()), Box::new(BINDING_SUCCESS)])?;
    assert_eq!(resp.transaction_id, req.transaction_id);
    assert_eq!(resp.typ, BINDING_SUCCESS);

    Ok(())
}

#[test]
fn test_message_marshal_unmarshal() -> Result<()> {
    let mut m = Message::new();
    m.build(&[
        Box::new(BINDING_REQUEST),
        Box::new(TransactionId::new()),
        Box::new(TextAttribute::new(ATTR_USERNAME, "user".to_owned())),
    ])?;

    let data = m.marshal_binary()?;
    let mut decoded = Message::new();
    decoded.unmarshal_binary(&data)?;
    assert_eq!(decoded, m);

    Ok(())
}
