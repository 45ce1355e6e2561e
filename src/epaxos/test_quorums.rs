use crate::epaxos::quorums::{fast_quorum, quorum};

#[test]
fn test_quorum() {
    assert_eq!(quorum(2), 2);
    assert_eq!(quorum(3), 2);
    assert_eq!(quorum(4), 3);
    assert_eq!(quorum(5), 3);
    assert_eq!(quorum(7), 4);
    assert_eq!(quorum(9), 5);
}

#[test]
fn test_fast_quorum() {
    assert_eq!(fast_quorum(2), 2);
    assert_eq!(fast_quorum(3), 2);
    assert_eq!(fast_quorum(4), 3);
    assert_eq!(fast_quorum(5), 4);
    assert_eq!(fast_quorum(7), 6);
    assert_eq!(fast_quorum(9), 7);
}

#[test]
fn test_fast_quorum_is_at_least_classic() {
    for n in 2..=16 {
        assert!(fast_quorum(n) >= quorum(n), "n={}", n);
        assert!(fast_quorum(n) <= n, "n={}", n);
    }
}
