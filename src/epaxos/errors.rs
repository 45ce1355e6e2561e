use super::ReplicaId;

quick_error! {
    /// Errors for messages that cannot be routed at the replica boundary.
    /// Protocol-invariant violations inside the state machine are bugs and
    /// panic instead, stale messages resolve to no action.
    #[derive(Debug, Eq, PartialEq)]
    pub enum ProtocolError {
        NoSuchRow(rid: ReplicaId, n: usize) {
            display("no such row: {}, group size: {}", rid, n)
        }

        EmptyCmds {
            display("proposal carries an empty command batch")
        }

        UnroutableProposal {
            display("proposals enter through propose(), not dispatch()")
        }
    }
}
