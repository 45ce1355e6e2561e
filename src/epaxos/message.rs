use serde::{Deserialize, Serialize};

use crate::command::Commands;
use crate::instance::{Instance, InstanceStatus};

use super::{Ballot, Dependencies, InstanceId, ReplicaId, Seq};

/// What the owning event loop must do with the outcome of one processing
/// call. Exactly one action comes out of every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    NoAction,
    /// Send back to the sender of the input message.
    Reply(Message),
    /// Send to every peer.
    Broadcast(Message),
    /// Send to a fast quorum of peers.
    FastQuorum(Message),
}

/// A client proposal entering the coordinator's own row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Propose {
    pub row_id: ReplicaId,
    pub instance_id: InstanceId,
    pub cmds: Commands,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreAccept {
    pub row_id: ReplicaId,
    pub instance_id: InstanceId,
    pub cmds: Commands,
    pub seq: Seq,
    pub deps: Dependencies,
    pub ballot: Ballot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreAcceptReply {
    pub row_id: ReplicaId,
    pub instance_id: InstanceId,
    pub ok: bool,
    pub ballot: Ballot,
    pub seq: Seq,
    pub deps: Dependencies,
}

/// Shorthand for "my (seq, deps) are exactly yours". Only valid as an
/// answer to a pre-accept at the initial ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreAcceptOk {
    pub row_id: ReplicaId,
    pub instance_id: InstanceId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accept {
    pub row_id: ReplicaId,
    pub instance_id: InstanceId,
    pub cmds: Commands,
    pub seq: Seq,
    pub deps: Dependencies,
    pub ballot: Ballot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptReply {
    pub row_id: ReplicaId,
    pub instance_id: InstanceId,
    pub ok: bool,
    pub ballot: Ballot,
}

/// Commits carry no ballot. They state a fact a quorum already decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub row_id: ReplicaId,
    pub instance_id: InstanceId,
    pub cmds: Commands,
    pub seq: Seq,
    pub deps: Dependencies,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prepare {
    pub row_id: ReplicaId,
    pub instance_id: InstanceId,
    pub ballot: Ballot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepareReply {
    pub row_id: ReplicaId,
    pub instance_id: InstanceId,
    pub ok: bool,
    pub status: InstanceStatus,
    pub cmds: Commands,
    pub seq: Seq,
    pub deps: Dependencies,
    pub ballot: Ballot,
    /// The ballot the reported payload was written under.
    pub original_ballot: Ballot,
    /// True when the replying replica owns the instance's row.
    pub is_from_leader: bool,
}

/// The tagged wire variant. Every kind carries the (row, instance)
/// address of the slot it is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    Propose(Propose),
    PreAccept(PreAccept),
    PreAcceptReply(PreAcceptReply),
    PreAcceptOk(PreAcceptOk),
    Accept(Accept),
    AcceptReply(AcceptReply),
    Commit(Commit),
    Prepare(Prepare),
    PrepareReply(PrepareReply),
}

impl Message {
    pub fn row_id(&self) -> ReplicaId {
        match self {
            Message::Propose(m) => m.row_id,
            Message::PreAccept(m) => m.row_id,
            Message::PreAcceptReply(m) => m.row_id,
            Message::PreAcceptOk(m) => m.row_id,
            Message::Accept(m) => m.row_id,
            Message::AcceptReply(m) => m.row_id,
            Message::Commit(m) => m.row_id,
            Message::Prepare(m) => m.row_id,
            Message::PrepareReply(m) => m.row_id,
        }
    }

    pub fn instance_id(&self) -> InstanceId {
        match self {
            Message::Propose(m) => m.instance_id,
            Message::PreAccept(m) => m.instance_id,
            Message::PreAcceptReply(m) => m.instance_id,
            Message::PreAcceptOk(m) => m.instance_id,
            Message::Accept(m) => m.instance_id,
            Message::AcceptReply(m) => m.instance_id,
            Message::Commit(m) => m.instance_id,
            Message::Prepare(m) => m.instance_id,
            Message::PrepareReply(m) => m.instance_id,
        }
    }

    /// The ballot the ordering discipline compares, when the kind carries
    /// one. Proposals, commits and pre-accept-oks do not.
    pub fn ballot(&self) -> Option<Ballot> {
        match self {
            Message::PreAccept(m) => Some(m.ballot),
            Message::PreAcceptReply(m) => Some(m.ballot),
            Message::Accept(m) => Some(m.ballot),
            Message::AcceptReply(m) => Some(m.ballot),
            Message::Prepare(m) => Some(m.ballot),
            Message::PrepareReply(m) => Some(m.ballot),
            Message::Propose(_) | Message::PreAcceptOk(_) | Message::Commit(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Message::Propose(_) => "propose",
            Message::PreAccept(_) => "pre-accept",
            Message::PreAcceptReply(_) => "pre-accept-reply",
            Message::PreAcceptOk(_) => "pre-accept-ok",
            Message::Accept(_) => "accept",
            Message::AcceptReply(_) => "accept-reply",
            Message::Commit(_) => "commit",
            Message::Prepare(_) => "prepare",
            Message::PrepareReply(_) => "prepare-reply",
        }
    }
}

impl Propose {
    pub fn new(row_id: ReplicaId, instance_id: InstanceId, cmds: Commands) -> Propose {
        Propose {
            row_id,
            instance_id,
            cmds,
        }
    }
}

impl PreAccept {
    /// A pre-accept carrying the instance's current payload and ballot.
    pub fn of(inst: &Instance) -> PreAccept {
        PreAccept {
            row_id: inst.row_id,
            instance_id: inst.id,
            cmds: inst.cmds.clone(),
            seq: inst.seq,
            deps: inst.deps.clone(),
            ballot: inst.ballot,
        }
    }
}

impl PreAcceptReply {
    pub fn ok(inst: &Instance) -> PreAcceptReply {
        PreAcceptReply {
            row_id: inst.row_id,
            instance_id: inst.id,
            ok: true,
            ballot: inst.ballot,
            seq: inst.seq,
            deps: inst.deps.clone(),
        }
    }

    pub fn nack(inst: &Instance) -> PreAcceptReply {
        PreAcceptReply {
            row_id: inst.row_id,
            instance_id: inst.id,
            ok: false,
            ballot: inst.ballot,
            seq: 0,
            deps: Dependencies::default(),
        }
    }
}

impl PreAcceptOk {
    pub fn of(inst: &Instance) -> PreAcceptOk {
        PreAcceptOk {
            row_id: inst.row_id,
            instance_id: inst.id,
        }
    }
}

impl Accept {
    pub fn of(inst: &Instance) -> Accept {
        Accept {
            row_id: inst.row_id,
            instance_id: inst.id,
            cmds: inst.cmds.clone(),
            seq: inst.seq,
            deps: inst.deps.clone(),
            ballot: inst.ballot,
        }
    }
}

impl AcceptReply {
    pub fn ok(inst: &Instance) -> AcceptReply {
        AcceptReply {
            row_id: inst.row_id,
            instance_id: inst.id,
            ok: true,
            ballot: inst.ballot,
        }
    }

    pub fn nack(inst: &Instance) -> AcceptReply {
        AcceptReply {
            row_id: inst.row_id,
            instance_id: inst.id,
            ok: false,
            ballot: inst.ballot,
        }
    }
}

impl Commit {
    pub fn of(inst: &Instance) -> Commit {
        Commit {
            row_id: inst.row_id,
            instance_id: inst.id,
            cmds: inst.cmds.clone(),
            seq: inst.seq,
            deps: inst.deps.clone(),
        }
    }
}

impl Prepare {
    pub fn of(inst: &Instance) -> Prepare {
        Prepare {
            row_id: inst.row_id,
            instance_id: inst.id,
            ballot: inst.ballot,
        }
    }
}

impl PrepareReply {
    pub fn nack(inst: &Instance) -> PrepareReply {
        PrepareReply {
            row_id: inst.row_id,
            instance_id: inst.id,
            ok: false,
            status: InstanceStatus::Nil,
            cmds: Commands::default(),
            seq: 0,
            deps: Dependencies::default(),
            ballot: inst.ballot,
            original_ballot: Ballot::default(),
            is_from_leader: false,
        }
    }
}
