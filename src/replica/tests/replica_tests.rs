use super::*;
use crate::command::AlwaysConflict;
use crate::epaxos::{
    AcceptReply, Action, Ballot, Message, PreAccept, PreAcceptOk, Prepare, ProtocolError, Propose,
};
use crate::instance::{Instance, InstanceStatus};

fn example_replica() -> Replica {
    Replica::new(Param::new(0, 5, Box::new(AlwaysConflict))).unwrap()
}

fn hello() -> Commands {
    cmds!["hello"]
}

#[test]
fn test_new_replica() {
    let r = example_replica();
    assert_eq!(r.id(), 0);
    assert_eq!(r.epoch(), 1);
    assert_eq!(r.group_size(), 5);
    assert_eq!(r.max_instance_id(3), 0);
    assert!(r.instance(0, 1).is_none());
}

#[test]
fn test_new_replica_bad_group_size() {
    for n in [0, 1].iter() {
        let err = Replica::new(Param::new(0, *n, Box::new(AlwaysConflict))).err();
        assert_eq!(err, Some(ReplicaError::BadGroupSize(*n)));
    }
}

#[test]
fn test_new_replica_bad_replica_id() {
    let err = Replica::new(Param::new(5, 5, Box::new(AlwaysConflict))).err();
    assert_eq!(err, Some(ReplicaError::BadReplicaId(5, 5)));
}

#[test]
fn test_quorums() {
    let r = example_replica();
    assert_eq!(r.quorum(), 3);
    assert_eq!(r.fast_quorum(), 4);
}

#[test]
fn test_make_initial_ballot() {
    let r = example_replica();
    assert_eq!(r.make_initial_ballot(), Ballot::new(1, 0, 0));
    assert!(r.make_initial_ballot().is_initial());
}

#[test]
fn test_propose_allocates_own_row_slots() {
    let mut r = example_replica();

    let (id, action) = r.propose(hello()).unwrap();
    assert_eq!(id, 1);
    match action {
        Action::FastQuorum(Message::PreAccept(pa)) => {
            assert_eq!(pa.row_id, 0);
            assert_eq!(pa.instance_id, 1);
            assert_eq!(pa.seq, 0);
            assert_eq!(pa.ballot, r.make_initial_ballot());
        }
        other => panic!("want a fast-quorum pre-accept, got {:?}", other),
    }
    assert_eq!(
        r.instance(0, 1).unwrap().status(),
        InstanceStatus::PreAccepted
    );

    // the second proposal conflicts with the first and depends on it
    let (id, action) = r.propose(cmds!["world"]).unwrap();
    assert_eq!(id, 2);
    match action {
        Action::FastQuorum(Message::PreAccept(pa)) => {
            assert_eq!(pa.deps, deps![1, 0, 0, 0, 0]);
            assert_eq!(pa.seq, 1);
        }
        other => panic!("want a fast-quorum pre-accept, got {:?}", other),
    }
    assert_eq!(r.max_instance_id(0), 2);
}

#[test]
fn test_propose_empty_cmds() {
    let mut r = example_replica();
    let err = r.propose(Commands::default()).err();
    assert_eq!(err, Some(ReplicaError::Protocol(ProtocolError::EmptyCmds)));
}

// A request for a slot this replica never saw synthesizes a placeholder.
#[test]
fn test_dispatch_synthesizes_placeholder() {
    let mut r = example_replica();

    let action = r
        .dispatch(Message::PreAccept(PreAccept {
            row_id: 1,
            instance_id: 3,
            cmds: hello(),
            seq: 0,
            deps: deps![0, 0, 0, 0, 0],
            ballot: Ballot::initial(1, 1),
        }))
        .unwrap();
    assert_eq!(
        action,
        Action::Reply(Message::PreAcceptOk(PreAcceptOk {
            row_id: 1,
            instance_id: 3,
        }))
    );

    let inst = r.instance(1, 3).unwrap();
    assert_eq!(inst.status(), InstanceStatus::PreAccepted);
    assert_eq!(inst.cmds(), &hello());
    assert_eq!(r.max_instance_id(1), 3);
}

#[test]
fn test_dispatch_unknown_row() {
    let mut r = example_replica();
    let err = r
        .dispatch(Message::Prepare(Prepare {
            row_id: 9,
            instance_id: 1,
            ballot: Ballot::new(1, 1, 0),
        }))
        .err();
    assert_eq!(err, Some(ReplicaError::Protocol(ProtocolError::NoSuchRow(9, 5))));
}

// A reply for a slot nobody asked about cannot be applied to anything.
#[test]
fn test_dispatch_reply_without_instance() {
    let mut r = example_replica();
    let err = r
        .dispatch(Message::AcceptReply(AcceptReply {
            row_id: 2,
            instance_id: 7,
            ok: true,
            ballot: Ballot::new(1, 1, 0),
        }))
        .err();
    assert_eq!(err, Some(ReplicaError::NoSuchInstance(2, 7)));
}

#[test]
fn test_dispatch_refuses_propose() {
    let mut r = example_replica();
    let err = r
        .dispatch(Message::Propose(Propose::new(0, 1, hello())))
        .err();
    assert_eq!(
        err,
        Some(ReplicaError::Protocol(ProtocolError::UnroutableProposal))
    );
}

#[test]
fn test_handle_timeout_opens_prepare() {
    let mut r = example_replica();
    let (id, _) = r.propose(hello()).unwrap();

    let action = r.handle_timeout(0, id).unwrap();
    assert_eq!(
        action,
        Action::Broadcast(Message::Prepare(Prepare {
            row_id: 0,
            instance_id: id,
            ballot: Ballot::new(1, 1, 0),
        }))
    );
    assert_eq!(
        r.instance(0, id).unwrap().status(),
        InstanceStatus::Preparing
    );
}

#[test]
fn test_handle_timeout_on_committed_is_noop() {
    let mut r = example_replica();
    let mut inst = Instance::new(0, 1, 5);
    inst.process(
        &r,
        Message::Commit(crate::epaxos::Commit {
            row_id: 0,
            instance_id: 1,
            cmds: hello(),
            seq: 0,
            deps: deps![0, 0, 0, 0, 0],
        }),
    );
    r.insert_instance(inst);

    let action = r.handle_timeout(0, 1).unwrap();
    assert_eq!(action, Action::NoAction);
    assert_eq!(
        r.instance(0, 1).unwrap().status(),
        InstanceStatus::Committed
    );
}

#[test]
fn test_handle_timeout_missing_instance() {
    let mut r = example_replica();
    let err = r.handle_timeout(0, 42).err();
    assert_eq!(err, Some(ReplicaError::NoSuchInstance(0, 42)));
}

// Wiring a real drain through Param works end to end.
#[test]
fn test_replica_with_term_logger() {
    use slog::Drain;

    let decorator = slog_term::PlainDecorator::new(std::io::sink());
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = std::sync::Mutex::new(drain).fuse();

    let mut param = Param::new(0, 5, Box::new(AlwaysConflict));
    param.logger = Some(slog::Logger::root(drain, o!("replica" => 0)));

    let mut r = Replica::new(param).unwrap();
    let (_, action) = r.propose(hello()).unwrap();
    assert!(matches!(action, Action::FastQuorum(_)));
}

#[test]
fn test_scan_conflicts() {
    let mut r = example_replica();

    let mut a = Instance::new(1, 4, 5);
    a.cmds = cmds!["a"];
    a.seq = 7;
    r.insert_instance(a);

    let mut b = Instance::new(1, 2, 5);
    b.cmds = cmds!["b"];
    b.seq = 9;
    r.insert_instance(b);

    // the highest conflicting slot per row wins the dep, the highest seq
    // anywhere feeds the new seq
    let (seq, deps) = r.scan_conflicts(0, 1, &hello());
    assert_eq!(deps, deps![0, 4, 0, 0, 0]);
    assert_eq!(seq, 10);
}

// The instance being processed never depends on itself.
#[test]
fn test_scan_conflicts_skips_self() {
    let mut r = example_replica();
    let mut a = Instance::new(0, 1, 5);
    a.cmds = hello();
    r.insert_instance(a);

    let (seq, deps) = r.scan_conflicts(0, 1, &hello());
    assert_eq!(deps, deps![0, 0, 0, 0, 0]);
    assert_eq!(seq, 0);

    let (seq, deps) = r.scan_conflicts(0, 2, &hello());
    assert_eq!(deps, deps![1, 0, 0, 0, 0]);
    assert_eq!(seq, 1);
}
