use crate::epaxos::{InstanceId, ProtocolError, ReplicaId};

quick_error! {
    /// ReplicaError is what the replica API surfaces for conditions the
    /// caller can act on. Anything that would mean a protocol bug panics
    /// inside the state machine instead.
    #[derive(Debug, Eq, PartialEq)]
    pub enum ReplicaError {
        Protocol(e: ProtocolError) {
            from()
            display("{}", e)
        }

        BadGroupSize(n: usize) {
            display("group size {} is out of range", n)
        }

        BadReplicaId(rid: ReplicaId, n: usize) {
            display("replica id {} does not fit a group of {}", rid, n)
        }

        NoSuchInstance(rid: ReplicaId, iid: InstanceId) {
            display("no instance at ({}, {})", rid, iid)
        }
    }
}
