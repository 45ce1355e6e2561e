use std::collections::HashMap;

use slog::{Discard, Logger};

use crate::command::{batches_conflict, Commands, ConflictOracle};
use crate::epaxos::{
    quorums, Action, Ballot, Dependencies, Epoch, InstanceId, Message, ProtocolError, Propose,
    ReplicaId, Seq,
};
use crate::instance::{Instance, InstanceStatus};

use super::errors::ReplicaError;

#[cfg(test)]
#[path = "tests/replica_tests.rs"]
mod tests;

/// Everything a replica needs to come up.
pub struct Param {
    pub replica_id: ReplicaId,
    pub group_size: usize,
    pub epoch: Epoch,
    pub oracle: Box<dyn ConflictOracle>,
    pub logger: Option<Logger>,
}

impl Param {
    pub fn new(replica_id: ReplicaId, group_size: usize, oracle: Box<dyn ConflictOracle>) -> Param {
        Param {
            replica_id,
            group_size,
            epoch: 1,
            oracle,
            logger: None,
        }
    }
}

/// Replica owns the 2-D instance log of its group: instance_matrix[r]
/// holds the row of instances authored by replica r, keyed by slot. All
/// processing runs on the owning event loop, one message at a time, so no
/// locking happens here.
pub struct Replica {
    id: ReplicaId,
    epoch: Epoch,
    group_size: usize,
    instance_matrix: Vec<HashMap<InstanceId, Instance>>,
    max_instance_ids: Vec<InstanceId>,
    oracle: Box<dyn ConflictOracle>,
    log: Logger,
}

impl Replica {
    pub fn new(param: Param) -> Result<Replica, ReplicaError> {
        let n = param.group_size;
        if n < 2 || n > usize::from(ReplicaId::MAX) + 1 {
            return Err(ReplicaError::BadGroupSize(n));
        }
        if usize::from(param.replica_id) >= n {
            return Err(ReplicaError::BadReplicaId(param.replica_id, n));
        }
        Ok(Replica {
            id: param.replica_id,
            epoch: param.epoch,
            group_size: n,
            instance_matrix: (0..n).map(|_| HashMap::new()).collect(),
            max_instance_ids: vec![0; n],
            oracle: param.oracle,
            log: param
                .logger
                .unwrap_or_else(|| Logger::root(Discard, o!())),
        })
    }

    pub fn id(&self) -> ReplicaId {
        self.id
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    pub fn logger(&self) -> &Logger {
        &self.log
    }

    /// Classic quorum, including this replica.
    pub fn quorum(&self) -> usize {
        quorums::quorum(self.group_size)
    }

    /// Fast-path quorum, including this replica.
    pub fn fast_quorum(&self) -> usize {
        quorums::fast_quorum(self.group_size)
    }

    pub fn make_initial_ballot(&self) -> Ballot {
        Ballot::initial(self.epoch, self.id)
    }

    pub fn make_initial_deps(&self) -> Dependencies {
        Dependencies::with_rows(self.group_size)
    }

    pub fn instance(&self, row_id: ReplicaId, id: InstanceId) -> Option<&Instance> {
        self.instance_matrix.get(usize::from(row_id))?.get(&id)
    }

    pub fn max_instance_id(&self, row_id: ReplicaId) -> InstanceId {
        self.max_instance_ids[usize::from(row_id)]
    }

    /// Installs an instance into the matrix, e.g. when reloading state or
    /// wiring up tests. Row bookkeeping follows.
    pub fn insert_instance(&mut self, inst: Instance) {
        let row = usize::from(inst.row_id());
        let id = inst.id();
        if id > self.max_instance_ids[row] {
            self.max_instance_ids[row] = id;
        }
        self.instance_matrix[row].insert(id, inst);
    }

    /// Handles a client proposal: allocates the next slot of this
    /// replica's own row and runs the new instance against it.
    pub fn propose(&mut self, cmds: Commands) -> Result<(InstanceId, Action), ReplicaError> {
        if cmds.is_empty() {
            return Err(ProtocolError::EmptyCmds.into());
        }
        let row = usize::from(self.id);
        let id = self.max_instance_ids[row] + 1;
        self.max_instance_ids[row] = id;
        let mut inst = Instance::new(self.id, id, self.group_size);
        let action = inst.process(self, Message::Propose(Propose::new(self.id, id, cmds)));
        self.instance_matrix[row].insert(id, inst);
        Ok((id, action))
    }

    /// Routes an inbound protocol message to the addressed instance. A
    /// request for a slot this replica has never seen synthesizes a
    /// nil-status placeholder first; a reply for an unknown slot is
    /// refused, since this replica cannot have asked for it.
    pub fn dispatch(&mut self, msg: Message) -> Result<Action, ReplicaError> {
        if let Message::Propose(_) = msg {
            return Err(ProtocolError::UnroutableProposal.into());
        }
        let row_id = msg.row_id();
        let row = usize::from(row_id);
        if row >= self.group_size {
            return Err(ProtocolError::NoSuchRow(row_id, self.group_size).into());
        }
        let id = msg.instance_id();
        let is_request = matches!(
            msg,
            Message::PreAccept(_) | Message::Accept(_) | Message::Commit(_) | Message::Prepare(_)
        );
        let mut inst = match self.instance_matrix[row].remove(&id) {
            Some(inst) => inst,
            None if is_request => Instance::new(row_id, id, self.group_size),
            None => return Err(ReplicaError::NoSuchInstance(row_id, id)),
        };
        if id > self.max_instance_ids[row] {
            self.max_instance_ids[row] = id;
        }
        let action = inst.process(self, msg);
        self.instance_matrix[row].insert(id, inst);
        Ok(action)
    }

    /// The suspicion timer fired on an unresolved instance: open a
    /// prepare round for it. Committed instances need no recovery.
    pub fn handle_timeout(
        &mut self,
        row_id: ReplicaId,
        id: InstanceId,
    ) -> Result<Action, ReplicaError> {
        let row = usize::from(row_id);
        if row >= self.group_size {
            return Err(ProtocolError::NoSuchRow(row_id, self.group_size).into());
        }
        let mut inst = self.instance_matrix[row]
            .remove(&id)
            .ok_or(ReplicaError::NoSuchInstance(row_id, id))?;
        let action = if inst.status() == InstanceStatus::Committed {
            Action::NoAction
        } else {
            inst.enter_preparing(self)
        };
        self.instance_matrix[row].insert(id, inst);
        Ok(action)
    }

    /// Computes (seq, deps) for a command batch against the local log:
    /// deps[r] is the highest instance in row r it conflicts with, seq is
    /// one past the highest conflicting seq. The instance being processed
    /// is skipped.
    pub fn scan_conflicts(
        &self,
        row_id: ReplicaId,
        id: InstanceId,
        cmds: &Commands,
    ) -> (Seq, Dependencies) {
        let mut seq = 0;
        let mut deps = Dependencies::with_rows(self.group_size);
        for row in 0..self.group_size {
            let rid = row as ReplicaId;
            for idx in (1..=self.max_instance_ids[row]).rev() {
                if rid == row_id && idx == id {
                    continue;
                }
                let other = match self.instance_matrix[row].get(&idx) {
                    Some(inst) => inst,
                    None => continue,
                };
                if !batches_conflict(self.oracle.as_ref(), cmds, other.cmds()) {
                    continue;
                }
                if deps[rid] == 0 {
                    deps[rid] = idx;
                }
                seq = std::cmp::max(seq, other.seq() + 1);
            }
        }
        (seq, deps)
    }
}
