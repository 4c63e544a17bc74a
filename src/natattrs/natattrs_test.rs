use super::*;

#[test]
fn test_change_request() -> Result<()> {
    let cases = [
        (false, false, 0x00u8),
        (false, true, 0x02),
        (true, false, 0x04),
        (true, true, 0x06),
    ];

    for (change_ip, change_port, flags) in cases {
        let mut m = Message::new();
        m.write_header();
        let cr = ChangeRequest {
            change_ip,
            change_port,
        };
        cr.add_to(&mut m)?;

        assert_eq!(m.get(ATTR_CHANGE_REQUEST)?, [0, 0, 0, flags]);

        let mut got = ChangeRequest::default();
        got.get_from(&m)?;
        assert_eq!(got, cr);
    }

    Ok(())
}

#[test]
fn test_change_request_invalid() {
    let mut got = ChangeRequest::default();

    let m = Message::new();
    assert_eq!(got.get_from(&m), Err(Error::ErrAttributeNotFound));

    let mut m = Message::new();
    m.write_header();
    m.add(ATTR_CHANGE_REQUEST, &[0, 0]);
    assert_eq!(got.get_from(&m), Err(Error::ErrAttributeSizeInvalid));
}
