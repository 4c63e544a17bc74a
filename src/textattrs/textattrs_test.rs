use super::*;

#[test]
fn test_software_get_from() -> Result<()> {
    let mut m = Message::new();
    let v = "Client v0.0.1".to_owned();
    m.add(ATTR_SOFTWARE, v.as_bytes());
    m.write_header();

    let mut m2 = Message::new();
    m2.write(&m.raw)?;

    let software = TextAttribute::get_from_as(&m2, ATTR_SOFTWARE)?;
    assert_eq!(software.to_string(), v);

    let s_attr = m2.attributes.get(ATTR_SOFTWARE);
    assert!(s_attr.is_some(), "software attribute should be found");
    assert_eq!(s_attr.unwrap().typ, ATTR_SOFTWARE);

    Ok(())
}

#[test]
fn test_software_add_to_invalid() {
    let mut m = Message::new();
    let s = TextAttribute::new(ATTR_SOFTWARE, String::from_utf8(vec![b'a'; 1024]).unwrap());
    let result = s.add_to(&mut m);
    assert!(
        matches!(result, Err(ref err) if is_attr_size_overflow(err)),
        "expected overflow, got: {result:?}"
    );
    assert_eq!(
        TextAttribute::get_from_as(&m, ATTR_SOFTWARE),
        Err(Error::ErrAttributeNotFound)
    );
}

// The encode-side cap checks the attribute's own length; attributes that
// arrived over-long on the wire are still readable.
#[test]
fn test_software_lenient_decode_regression() -> Result<()> {
    let mut m = Message::new();
    m.write_header();
    let text = vec![b'a'; 1000]; // over MAX_SOFTWARE_B
    m.add(ATTR_SOFTWARE, &text);

    let mut decoded = Message::new();
    decoded.write(&m.raw)?;
    let software = TextAttribute::get_from_as(&decoded, ATTR_SOFTWARE)?;
    assert_eq!(software.text.len(), 1000);

    Ok(())
}

#[test]
fn test_username_limit() {
    let mut m = Message::new();
    m.write_header();

    let ok = TextAttribute::new(ATTR_USERNAME, "a".repeat(513));
    assert!(ok.add_to(&mut m).is_ok());

    let over = TextAttribute::new(ATTR_USERNAME, "a".repeat(514));
    let mut m = Message::new();
    m.write_header();
    assert!(over.add_to(&mut m).is_err());
}

#[test]
fn test_text_attribute_kinds() -> Result<()> {
    let kinds = [
        (ATTR_USERNAME, "user"),
        (ATTR_REALM, "realm"),
        (ATTR_NONCE, "nonce"),
        (ATTR_SOFTWARE, "software"),
        (ATTR_ORIGIN, "https://example.org"),
    ];

    let mut m = Message::new();
    m.write_header();
    for (attr, text) in kinds {
        TextAttribute::new(attr, text.to_owned()).add_to(&mut m)?;
    }
    for (attr, text) in kinds {
        let mut got = TextAttribute {
            attr,
            ..Default::default()
        };
        got.get_from(&m)?;
        assert_eq!(got.text, text, "{attr}");
    }

    Ok(())
}

#[test]
fn test_text_attribute_unsupported_type() {
    let mut m = Message::new();
    m.write_header();
    let t = TextAttribute::new(ATTR_FINGERPRINT, "x".to_owned());
    assert!(t.add_to(&mut m).is_err());
    assert!(TextAttribute::get_from_as(&m, ATTR_FINGERPRINT).is_err());
}
