use super::*;

#[test]
fn test_channel_number() -> Result<()> {
    let mut m = Message::new();
    m.write_header();
    let n = ChannelNumber(0x4000);
    assert_eq!(n.to_string(), "CN 0x4000");
    n.add_to(&mut m)?;

    assert_eq!(m.get(ATTR_CHANNEL_NUMBER)?, [0x40, 0x00, 0x00, 0x00]);

    let mut got = ChannelNumber::default();
    got.get_from(&m)?;
    assert_eq!(got, n);

    Ok(())
}

#[test]
fn test_lifetime() -> Result<()> {
    let mut m = Message::new();
    m.write_header();
    let l = Lifetime(Duration::from_secs(600));
    assert_eq!(l.to_string(), "600s");
    l.add_to(&mut m)?;

    assert_eq!(m.get(ATTR_LIFETIME)?, [0x00, 0x00, 0x02, 0x58]);

    let mut got = Lifetime::default();
    got.get_from(&m)?;
    assert_eq!(got, l);

    //"bad size"
    let mut m = Message::new();
    m.write_header();
    m.add(ATTR_LIFETIME, &[1, 2]);
    assert_eq!(got.get_from(&m), Err(Error::ErrAttributeSizeInvalid));

    Ok(())
}

#[test]
fn test_data() -> Result<()> {
    let mut m = Message::new();
    m.write_header();
    let d = Data(vec![1, 2, 33, 44, 0x13, 0xaf]);
    d.add_to(&mut m)?;

    let mut decoded = Message::new();
    decoded.write(&m.raw)?;
    let mut got = Data::default();
    got.get_from(&decoded)?;
    assert_eq!(got, d);

    Ok(())
}

#[test]
fn test_even_port() -> Result<()> {
    for reserve in [true, false] {
        let mut m = Message::new();
        m.write_header();
        EvenPort {
            reserve_additional: reserve,
        }
        .add_to(&mut m)?;

        let v = m.get(ATTR_EVEN_PORT)?;
        assert_eq!(v.len(), 1);
        assert_eq!(v[0], if reserve { 0x80 } else { 0x00 });

        let mut got = EvenPort::default();
        got.get_from(&m)?;
        assert_eq!(got.reserve_additional, reserve);
    }

    Ok(())
}

#[test]
fn test_requested_transport() -> Result<()> {
    let mut m = Message::new();
    m.write_header();
    let r = RequestedTransport {
        protocol: PROTO_UDP,
    };
    assert_eq!(r.to_string(), "protocol: UDP");
    r.add_to(&mut m)?;

    assert_eq!(m.get(ATTR_REQUESTED_TRANSPORT)?, [17, 0, 0, 0]);

    let mut got = RequestedTransport::default();
    got.get_from(&m)?;
    assert_eq!(got, r);

    assert_eq!(PROTO_TCP.to_string(), "TCP");
    assert_eq!(Protocol(41).to_string(), "41");

    Ok(())
}

#[test]
fn test_dont_fragment() -> Result<()> {
    let mut m = Message::new();
    m.write_header();
    assert!(!DontFragmentAttr::is_set(&m));

    DontFragmentAttr.add_to(&mut m)?;
    assert!(DontFragmentAttr::is_set(&m));

    Ok(())
}

#[test]
fn test_reservation_token() -> Result<()> {
    let mut m = Message::new();
    m.write_header();
    let tok = ReservationToken(vec![1, 2, 3, 4, 5, 6, 7, 8]);
    tok.add_to(&mut m)?;

    let mut got = ReservationToken::default();
    got.get_from(&m)?;
    assert_eq!(got, tok);

    //"wrong size refused on encode"
    let bad = ReservationToken(vec![1, 2, 3]);
    let mut m = Message::new();
    m.write_header();
    assert_eq!(bad.add_to(&mut m), Err(Error::ErrAttributeSizeInvalid));

    Ok(())
}
