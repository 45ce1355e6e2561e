use crate::epaxos::Ballot;

#[test]
fn test_ballot_new() {
    let b = Ballot::new(2, 3, 4);
    assert_eq!(b.epoch(), 2);
    assert_eq!(b.number(), 3);
    assert_eq!(b.replica_id(), 4);

    let b: Ballot = (2u32, 3u64, 4u8).into();
    assert_eq!(b, Ballot::new(2, 3, 4));
}

#[test]
fn test_ballot_default_is_zero() {
    let b = Ballot::default();
    assert_eq!(b, Ballot::new(0, 0, 0));
    assert!(b.is_initial());
}

#[test]
fn test_ballot_initial() {
    let b = Ballot::initial(2, 7);
    assert!(b.is_initial());
    assert_eq!(b.number(), 0);
    assert!(!b.inc_number().is_initial());
}

#[test]
fn test_ballot_ordering() {
    // epoch dominates number dominates replica id
    assert!(Ballot::new(2, 0, 0) > Ballot::new(1, 9, 9));
    assert!(Ballot::new(1, 5, 0) > Ballot::new(1, 4, 9));
    assert!(Ballot::new(1, 4, 3) > Ballot::new(1, 4, 2));
    assert_eq!(Ballot::new(1, 4, 3), Ballot::new(1, 4, 3));

    let b = Ballot::new(1, 4, 3);
    assert!(b.inc_number() > b);
}

#[test]
fn test_ballot_pack_unpack() {
    let cases = vec![
        Ballot::new(0, 0, 0),
        Ballot::new(1, 0, 0),
        Ballot::new(2, 3, 4),
        Ballot::new((1 << 20) - 1, (1 << 36) - 1, 255),
    ];
    for b in cases {
        assert_eq!(Ballot::unpack(b.pack()), b);
    }

    // layout is 20 | 36 | 8 from the high bits down
    let b = Ballot::new(1, 1, 1);
    assert_eq!(b.pack(), (1 << 44) | (1 << 8) | 1);

    // packed order matches semantic order
    assert!(Ballot::new(1, 5, 0).pack() > Ballot::new(1, 4, 9).pack());
}

#[test]
fn test_ballot_wire_form_is_packed_u64() {
    let b = Ballot::new(2, 3, 4);
    let yaml = serde_yaml::to_string(&b).unwrap();
    let n: u64 = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(n, b.pack());

    let back: Ballot = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, b);
}

#[test]
fn test_ballot_display() {
    assert_eq!(format!("{}", Ballot::new(2, 3, 4)), "(2, 3, 4)");
}
