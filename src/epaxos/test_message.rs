use crate::epaxos::*;
use crate::instance::{Instance, InstanceStatus};

fn example_instance() -> Instance {
    let mut i = Instance::new(2, 7, 5);
    i.cmds = cmds!["hello"];
    i.seq = 3;
    i.deps = deps![1, 0, 2, 0, 0];
    i.ballot = Ballot::new(1, 0, 2);
    i
}

#[test]
fn test_message_of_instance() {
    let i = example_instance();

    let pa = PreAccept::of(&i);
    assert_eq!(pa.row_id, 2);
    assert_eq!(pa.instance_id, 7);
    assert_eq!(pa.cmds, i.cmds().clone());
    assert_eq!(pa.seq, 3);
    assert_eq!(pa.deps, i.deps().clone());
    assert_eq!(pa.ballot, i.ballot());

    let c = Commit::of(&i);
    assert_eq!(c.cmds, i.cmds().clone());
    assert_eq!(c.seq, 3);

    let p = Prepare::of(&i);
    assert_eq!(p.ballot, i.ballot());

    let ok = PreAcceptOk::of(&i);
    assert_eq!((ok.row_id, ok.instance_id), (2, 7));
}

#[test]
fn test_reply_constructors() {
    let i = example_instance();

    let rep = PreAcceptReply::ok(&i);
    assert!(rep.ok);
    assert_eq!(rep.seq, i.seq());
    assert_eq!(rep.ballot, i.ballot());

    let rep = PreAcceptReply::nack(&i);
    assert!(!rep.ok);
    assert_eq!(rep.ballot, i.ballot());

    let rep = AcceptReply::nack(&i);
    assert!(!rep.ok);
    assert_eq!(rep.ballot, i.ballot());

    let rep = PrepareReply::nack(&i);
    assert!(!rep.ok);
    assert_eq!(rep.ballot, i.ballot());
    assert_eq!(rep.status, InstanceStatus::Nil);
}

#[test]
fn test_message_accessors() {
    let i = example_instance();
    let m = Message::PreAccept(PreAccept::of(&i));
    assert_eq!(m.row_id(), 2);
    assert_eq!(m.instance_id(), 7);
    assert_eq!(m.ballot(), Some(i.ballot()));
    assert_eq!(m.kind(), "pre-accept");

    let m = Message::Commit(Commit::of(&i));
    assert_eq!(m.ballot(), None);
    assert_eq!(m.kind(), "commit");

    let m = Message::Propose(Propose::new(0, 1, cmds!["x"]));
    assert_eq!(m.ballot(), None);
    assert_eq!((m.row_id(), m.instance_id()), (0, 1));
}

// One round trip through the tagged wire form. The ballot travels as its
// packed 64-bit integer.
#[test]
fn test_message_round_trip() {
    let i = example_instance();
    let m = Message::PreAccept(PreAccept::of(&i));

    let yaml = serde_yaml::to_string(&m).unwrap();
    assert!(yaml.contains(&format!("{}", i.ballot().pack())));

    let back: Message = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(back, m);
}
