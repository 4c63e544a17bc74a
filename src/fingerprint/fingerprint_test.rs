use super::*;
use crate::agent::TransactionId;
use crate::attributes::*;
use crate::integrity::MessageIntegrity;
use crate::textattrs::TextAttribute;

#[test]
fn test_fingerprint_uses_crc_32_iso_hdlc() {
    let mut m = Message::new();
    let a = TextAttribute::new(ATTR_SOFTWARE, "software".to_owned());

    m.write_header();
    a.add_to(&mut m).unwrap();
    m.write_header();

    assert_eq!(
        Crc::<u32>::new(&CRC_32_ISO_HDLC).checksum(&m.raw) ^ FINGERPRINT_XOR_VALUE,
        fingerprint_value(&m.raw)
    );
}

#[test]
fn test_fingerprint_check() -> Result<()> {
    let mut m = Message::new();
    let a = TextAttribute::new(ATTR_SOFTWARE, "software".to_owned());
    m.transaction_id = TransactionId([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
    m.write_header();
    a.add_to(&mut m)?;

    FINGERPRINT.add_to(&mut m)?;
    m.write_header();
    FINGERPRINT.check(&m)?;

    // Mutating any byte before the fingerprint value breaks the check.
    m.raw[3] += 1;

    let result = FINGERPRINT.check(&m);
    assert_eq!(result, Err(Error::ErrFingerprintMismatch));

    Ok(())
}

#[test]
fn test_fingerprint_check_bad() -> Result<()> {
    let mut m = Message::new();
    let a = TextAttribute::new(ATTR_SOFTWARE, "software".to_owned());
    m.write_header();
    a.add_to(&mut m)?;

    let result = FINGERPRINT.check(&m);
    assert_eq!(result, Err(Error::ErrAttributeNotFound));

    // A fingerprint attribute of the wrong size is rejected before any
    // CRC work.
    m.add(ATTR_FINGERPRINT, &[1, 2, 3]);
    let result = FINGERPRINT.check(&m);
    assert!(
        matches!(result, Err(ref err) if is_attr_size_invalid(err)),
        "IsAttrSizeInvalid should be true for {result:?}"
    );

    Ok(())
}

#[test]
fn test_fingerprint_detects_any_prefix_mutation() -> Result<()> {
    let mut m = Message::new();
    m.transaction_id = TransactionId([7; 12]);
    m.write_header();
    TextAttribute::new(ATTR_SOFTWARE, "x".to_owned()).add_to(&mut m)?;
    FINGERPRINT.add_to(&mut m)?;
    FINGERPRINT.check(&m)?;

    let tail = FINGERPRINT_SIZE + ATTRIBUTE_HEADER_SIZE;
    for i in 0..m.raw.len() - tail {
        let mut tampered = Message::new();
        m.clone_to(&mut tampered)?;
        tampered.raw[i] ^= 0xff;
        // The header length byte keeps decode in sync; everything else is
        // checked on the raw buffer directly.
        assert!(
            FINGERPRINT.check(&tampered).is_err(),
            "flip at {i} went undetected"
        );
    }

    Ok(())
}

#[test]
fn test_fingerprint_before_integrity_rejected() -> Result<()> {
    let mut m = Message::new();
    m.write_header();

    FINGERPRINT.add_to(&mut m)?;
    let i = MessageIntegrity::new_short_term_integrity("password".to_owned());
    assert_eq!(i.add_to(&mut m), Err(Error::ErrFingerprintBeforeIntegrity));

    Ok(())
}
