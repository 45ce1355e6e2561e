use std::cmp;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::command::Commands;
use crate::epaxos::{
    Accept, AcceptReply, Action, Ballot, Commit, Dependencies, InstanceId, Message, PreAccept,
    PreAcceptOk, PreAcceptReply, Prepare, PrepareReply, Propose, ReplicaId, Seq,
};
use crate::replica::Replica;

#[cfg(test)]
#[path = "tests/instance_tests.rs"]
mod tests;

/// Status of an instance. The first four are strictly ordered and only move
/// forward. Preparing is the recovery state: it resolves back into one of
/// the others depending on what the prepare round learns.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum InstanceStatus {
    Nil,
    PreAccepted,
    Accepted,
    Committed,
    Preparing,
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            InstanceStatus::Nil => "nil",
            InstanceStatus::PreAccepted => "pre-accepted",
            InstanceStatus::Accepted => "accepted",
            InstanceStatus::Committed => "committed",
            InstanceStatus::Preparing => "preparing",
        };
        f.write_str(s)
    }
}

/// Coordinator-side bookkeeping. Only meaningful while this replica runs
/// the initial round of an instance it proposed itself; reset on every
/// transition into a counting regime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceInfo {
    /// Latches false the moment any peer vote diverges from the
    /// coordinator's payload. Never re-arms.
    pub(crate) same_pre_accept_replies: bool,
    pub(crate) pre_accept_ok_count: usize,
    pub(crate) pre_accept_reply_count: usize,
    pub(crate) accept_reply_count: usize,
}

impl Default for InstanceInfo {
    fn default() -> InstanceInfo {
        InstanceInfo {
            same_pre_accept_replies: true,
            pre_accept_ok_count: 0,
            pre_accept_reply_count: 0,
            accept_reply_count: 0,
        }
    }
}

/// Recovery bookkeeping, used only while status is Preparing. Tracks the
/// best payload candidate learned from prepare replies so far, plus the
/// snapshot of what this instance was before entering recovery.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecoveryInfo {
    pub(crate) status: InstanceStatus,
    /// Original ballot of the candidate payload.
    pub(crate) ballot: Ballot,
    pub(crate) cmds: Commands,
    pub(crate) seq: Seq,
    pub(crate) deps: Dependencies,
    pub(crate) former_status: InstanceStatus,
    pub(crate) former_ballot: Ballot,
    pub(crate) reply_count: usize,
    pub(crate) identical_count: usize,
}

impl Default for InstanceStatus {
    fn default() -> InstanceStatus {
        InstanceStatus::Nil
    }
}

/// One slot of the instance matrix, identified by (row_id, id). Owns the
/// protocol state of a single consensus instance and advances it one
/// message at a time. The owning replica is passed into each call; the
/// instance never holds on to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    pub(crate) row_id: ReplicaId,
    pub(crate) id: InstanceId,
    pub(crate) status: InstanceStatus,
    pub(crate) ballot: Ballot,
    pub(crate) cmds: Commands,
    pub(crate) seq: Seq,
    pub(crate) deps: Dependencies,
    pub(crate) info: InstanceInfo,
    pub(crate) recovery: RecoveryInfo,
    pub(crate) executed: bool,
}

impl Instance {
    pub fn new(row_id: ReplicaId, id: InstanceId, group_size: usize) -> Instance {
        Instance {
            row_id,
            id,
            status: InstanceStatus::Nil,
            ballot: Ballot::default(),
            cmds: Commands::default(),
            seq: 0,
            deps: Dependencies::with_rows(group_size),
            info: InstanceInfo::default(),
            recovery: RecoveryInfo::default(),
            executed: false,
        }
    }

    pub fn row_id(&self) -> ReplicaId {
        self.row_id
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn status(&self) -> InstanceStatus {
        self.status
    }

    pub fn ballot(&self) -> Ballot {
        self.ballot
    }

    pub fn cmds(&self) -> &Commands {
        &self.cmds
    }

    pub fn seq(&self) -> Seq {
        self.seq
    }

    pub fn deps(&self) -> &Dependencies {
        &self.deps
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    /// Marks the instance as applied to the state machine. The execution
    /// layer calls this after the committed graph walk.
    pub fn set_executed(&mut self) {
        self.check_status(&[InstanceStatus::Committed]);
        self.executed = true;
    }

    /// Single entry point: advance this instance by one message and tell
    /// the event loop what to send where.
    pub fn process(&mut self, r: &Replica, msg: Message) -> Action {
        match self.status {
            InstanceStatus::Nil => self.nil_status_process(r, msg),
            InstanceStatus::PreAccepted => self.pre_accepted_process(r, msg),
            InstanceStatus::Accepted => self.accepted_process(r, msg),
            InstanceStatus::Committed => self.committed_process(r, msg),
            InstanceStatus::Preparing => self.preparing_process(r, msg),
        }
    }

    fn check_status(&self, allowed: &[InstanceStatus]) {
        if !allowed.contains(&self.status) {
            panic!(
                "instance ({}, {}) is {}, want one of {:?}",
                self.row_id, self.id, self.status, allowed
            );
        }
    }

    fn is_at_initial_round(&self) -> bool {
        self.ballot.is_initial()
    }

    // ---------------------------------------------------------------
    // per-status processing
    // ---------------------------------------------------------------

    /// A freshly synthesized placeholder. Replies arriving here at the
    /// initial round are bugs: this instance never asked for anything. At
    /// a later round the instance was reverted from preparing, so replies
    /// to the dead round are dropped as stale.
    fn nil_status_process(&mut self, r: &Replica, msg: Message) -> Action {
        self.check_status(&[InstanceStatus::Nil]);
        match msg {
            Message::Propose(p) => self.handle_propose(r, p),
            Message::PreAccept(p) => {
                if p.ballot < self.ballot {
                    return self.reject_pre_accept();
                }
                self.handle_pre_accept(r, p)
            }
            Message::Accept(a) => {
                if a.ballot < self.ballot {
                    return self.reject_accept();
                }
                self.handle_accept(a)
            }
            Message::Commit(c) => self.handle_commit(r, c),
            Message::Prepare(p) => {
                if p.ballot < self.ballot {
                    return self.reject_prepare();
                }
                self.handle_prepare(r, p)
            }
            Message::PreAcceptReply(_)
            | Message::PreAcceptOk(_)
            | Message::AcceptReply(_)
            | Message::PrepareReply(_) => {
                if self.is_at_initial_round() {
                    panic!(
                        "nil instance ({}, {}) got a {} it never asked for",
                        self.row_id,
                        self.id,
                        msg.kind()
                    );
                }
                Action::NoAction
            }
        }
    }

    fn pre_accepted_process(&mut self, r: &Replica, msg: Message) -> Action {
        self.check_status(&[InstanceStatus::PreAccepted]);
        match msg {
            Message::PreAccept(p) => {
                if p.ballot < self.ballot {
                    return self.reject_pre_accept();
                }
                self.handle_pre_accept(r, p)
            }
            Message::Accept(a) => {
                if a.ballot < self.ballot {
                    return self.reject_accept();
                }
                self.handle_accept(a)
            }
            Message::Commit(c) => self.handle_commit(r, c),
            Message::Prepare(p) => {
                if p.ballot < self.ballot {
                    return self.reject_prepare();
                }
                self.handle_prepare(r, p)
            }
            Message::PreAcceptReply(p) => {
                if !self.is_at_initial_round() {
                    // The coordinator role was lost to a higher round.
                    return Action::NoAction;
                }
                self.handle_pre_accept_reply(r, p)
            }
            Message::PreAcceptOk(_) => {
                if !self.is_at_initial_round() {
                    return Action::NoAction;
                }
                self.handle_pre_accept_ok(r)
            }
            Message::PrepareReply(_) => {
                if self.is_at_initial_round() {
                    panic!(
                        "pre-accepted instance ({}, {}) never sent a prepare",
                        self.row_id, self.id
                    );
                }
                Action::NoAction
            }
            Message::AcceptReply(_) => panic!(
                "accept-reply at pre-accepted instance ({}, {}): accepted cannot regress",
                self.row_id, self.id
            ),
            Message::Propose(_) => panic!(
                "propose at pre-accepted instance ({}, {})",
                self.row_id, self.id
            ),
        }
    }

    fn accepted_process(&mut self, r: &Replica, msg: Message) -> Action {
        self.check_status(&[InstanceStatus::Accepted]);
        match msg {
            // An accepted instance already passed the pre-accept phase. A
            // pre-accept is answered negatively without adopting its
            // ballot, whatever that ballot is.
            Message::PreAccept(_) => self.reject_pre_accept(),
            Message::Accept(a) => {
                if a.ballot < self.ballot {
                    return self.reject_accept();
                }
                self.handle_accept(a)
            }
            Message::Commit(c) => self.handle_commit(r, c),
            Message::Prepare(p) => {
                if p.ballot < self.ballot {
                    return self.reject_prepare();
                }
                self.handle_prepare(r, p)
            }
            Message::AcceptReply(a) => {
                if a.ballot < self.ballot {
                    return Action::NoAction;
                }
                self.handle_accept_reply(r, a)
            }
            Message::PreAcceptReply(_) | Message::PreAcceptOk(_) => Action::NoAction,
            Message::PrepareReply(_) => {
                if self.is_at_initial_round() {
                    panic!(
                        "accepted instance ({}, {}) never sent a prepare",
                        self.row_id, self.id
                    );
                }
                Action::NoAction
            }
            Message::Propose(_) => panic!(
                "propose at accepted instance ({}, {})",
                self.row_id, self.id
            ),
        }
    }

    /// Terminal. The payload is frozen; requests are refused, replies
    /// dropped, prepares answered informatively without a ballot change.
    fn committed_process(&mut self, r: &Replica, msg: Message) -> Action {
        self.check_status(&[InstanceStatus::Committed]);
        match msg {
            Message::PreAccept(_) => self.reject_pre_accept(),
            Message::Accept(_) => self.reject_accept(),
            Message::Commit(_) => Action::NoAction,
            Message::Prepare(p) => Action::Reply(Message::PrepareReply(PrepareReply {
                row_id: self.row_id,
                instance_id: self.id,
                ok: true,
                status: InstanceStatus::Committed,
                cmds: self.cmds.clone(),
                seq: self.seq,
                deps: self.deps.clone(),
                ballot: p.ballot,
                original_ballot: self.ballot,
                is_from_leader: r.id() == self.row_id,
            })),
            Message::PreAcceptReply(_)
            | Message::PreAcceptOk(_)
            | Message::AcceptReply(_)
            | Message::PrepareReply(_) => Action::NoAction,
            Message::Propose(_) => panic!(
                "propose at committed instance ({}, {})",
                self.row_id, self.id
            ),
        }
    }

    fn preparing_process(&mut self, r: &Replica, msg: Message) -> Action {
        self.check_status(&[InstanceStatus::Preparing]);
        match msg {
            Message::PreAccept(p) => {
                if p.ballot < self.ballot {
                    return self.reject_pre_accept();
                }
                self.handle_pre_accept(r, p)
            }
            Message::Accept(a) => {
                if a.ballot < self.ballot {
                    return self.reject_accept();
                }
                self.handle_accept(a)
            }
            Message::Commit(c) => self.handle_commit(r, c),
            Message::Prepare(p) => {
                // This instance coordinates its own prepare ballot. Nobody
                // else may show up with the same one.
                if p.ballot == self.ballot {
                    panic!(
                        "prepare at instance ({}, {}) with our own recovery ballot {}",
                        self.row_id, self.id, p.ballot
                    );
                }
                if p.ballot < self.ballot {
                    return self.reject_prepare();
                }
                self.handle_prepare(r, p)
            }
            Message::PrepareReply(p) => {
                if p.ballot < self.ballot {
                    return Action::NoAction;
                }
                if !p.ok {
                    // Someone is past our round. Adopt and let the next
                    // suspicion timeout retry higher.
                    self.ballot = p.ballot;
                    debug!(r.logger(), "prepare round rejected, stepping down";
                        "row" => self.row_id, "id" => self.id, "ballot" => %self.ballot);
                    return Action::NoAction;
                }
                if p.ballot > self.ballot {
                    panic!(
                        "positive prepare-reply at instance ({}, {}) from future ballot {}",
                        self.row_id, self.id, p.ballot
                    );
                }
                self.handle_prepare_reply(r, p)
            }
            Message::PreAcceptReply(_) | Message::PreAcceptOk(_) => {
                match self.recovery.former_status {
                    InstanceStatus::PreAccepted | InstanceStatus::Accepted => Action::NoAction,
                    _ => panic!(
                        "instance ({}, {}) never coordinated a pre-accept round",
                        self.row_id, self.id
                    ),
                }
            }
            Message::AcceptReply(_) => match self.recovery.former_status {
                InstanceStatus::Accepted => Action::NoAction,
                _ => panic!(
                    "instance ({}, {}) never coordinated an accept round",
                    self.row_id, self.id
                ),
            },
            Message::Propose(_) => panic!(
                "propose at preparing instance ({}, {})",
                self.row_id, self.id
            ),
        }
    }

    // ---------------------------------------------------------------
    // request handlers
    // ---------------------------------------------------------------

    fn handle_propose(&mut self, r: &Replica, p: Propose) -> Action {
        self.check_status(&[InstanceStatus::Nil]);
        assert!(!p.cmds.is_empty(), "empty command batch in proposal");
        assert_eq!(
            self.ballot,
            Ballot::default(),
            "propose on an instance that is not freshly created"
        );
        self.ballot = r.make_initial_ballot();
        let (seq, deps) = r.scan_conflicts(self.row_id, self.id, &p.cmds);
        self.cmds = p.cmds;
        self.seq = seq;
        self.deps = deps;
        self.enter_pre_accepted();
        debug!(r.logger(), "proposing";
            "row" => self.row_id, "id" => self.id,
            "seq" => self.seq, "ballot" => %self.ballot);
        Action::FastQuorum(Message::PreAccept(PreAccept::of(self)))
    }

    /// Shared by nil, pre-accepted and preparing. Recomputes (seq, deps)
    /// against the local log, unions them with the message's, and answers
    /// with the cheap ok token when nothing changed at the initial ballot.
    fn handle_pre_accept(&mut self, r: &Replica, p: PreAccept) -> Action {
        self.check_status(&[
            InstanceStatus::Nil,
            InstanceStatus::PreAccepted,
            InstanceStatus::Preparing,
        ]);
        assert!(p.ballot >= self.ballot, "stale pre-accept reached a handler");
        self.ballot = p.ballot;

        let (scan_seq, scan_deps) = r.scan_conflicts(self.row_id, self.id, &p.cmds);
        let seq = cmp::max(p.seq, scan_seq);
        let mut deps = p.deps.clone();
        deps.union(&scan_deps);
        let identical = seq == p.seq && deps == p.deps;

        self.cmds = p.cmds;
        self.seq = seq;
        self.deps = deps;
        self.enter_pre_accepted();

        if identical && p.ballot.is_initial() {
            Action::Reply(Message::PreAcceptOk(PreAcceptOk::of(self)))
        } else {
            Action::Reply(Message::PreAcceptReply(PreAcceptReply::ok(self)))
        }
    }

    fn handle_accept(&mut self, a: Accept) -> Action {
        self.check_status(&[
            InstanceStatus::Nil,
            InstanceStatus::PreAccepted,
            InstanceStatus::Accepted,
            InstanceStatus::Preparing,
        ]);
        assert!(a.ballot >= self.ballot, "stale accept reached a handler");
        self.ballot = a.ballot;
        self.cmds = a.cmds;
        self.seq = a.seq;
        self.deps = a.deps;
        self.status = InstanceStatus::Accepted;
        Action::Reply(Message::AcceptReply(AcceptReply::ok(self)))
    }

    /// Commits are unconditional: they carry a fact a quorum decided.
    fn handle_commit(&mut self, r: &Replica, c: Commit) -> Action {
        self.check_status(&[
            InstanceStatus::Nil,
            InstanceStatus::PreAccepted,
            InstanceStatus::Accepted,
            InstanceStatus::Preparing,
        ]);
        self.cmds = c.cmds;
        self.seq = c.seq;
        self.deps = c.deps;
        self.status = InstanceStatus::Committed;
        debug!(r.logger(), "committed by message";
            "row" => self.row_id, "id" => self.id, "seq" => self.seq);
        Action::NoAction
    }

    fn handle_prepare(&mut self, r: &Replica, p: Prepare) -> Action {
        self.check_status(&[
            InstanceStatus::Nil,
            InstanceStatus::PreAccepted,
            InstanceStatus::Accepted,
            InstanceStatus::Preparing,
        ]);
        assert!(p.ballot >= self.ballot, "stale prepare reached a handler");
        // A preparing instance reports the payload it held before opening
        // its own recovery round, not the probe itself.
        let (status, original_ballot) = if self.status == InstanceStatus::Preparing {
            (self.recovery.former_status, self.recovery.former_ballot)
        } else {
            (self.status, self.ballot)
        };
        self.ballot = p.ballot;
        Action::Reply(Message::PrepareReply(PrepareReply {
            row_id: self.row_id,
            instance_id: self.id,
            ok: true,
            status,
            cmds: self.cmds.clone(),
            seq: self.seq,
            deps: self.deps.clone(),
            ballot: p.ballot,
            original_ballot,
            is_from_leader: r.id() == self.row_id,
        }))
    }

    // ---------------------------------------------------------------
    // reply handlers (coordinator side)
    // ---------------------------------------------------------------

    fn handle_pre_accept_reply(&mut self, r: &Replica, p: PreAcceptReply) -> Action {
        self.check_status(&[InstanceStatus::PreAccepted]);
        if p.ballot < self.ballot {
            return Action::NoAction;
        }
        if !p.ok {
            // A peer holds a larger ballot. Adopt it and stop coordinating.
            self.ballot = p.ballot;
            debug!(r.logger(), "pre-accept nacked, stepping down";
                "row" => self.row_id, "id" => self.id, "ballot" => %self.ballot);
            return Action::NoAction;
        }
        self.info.pre_accept_reply_count += 1;

        if p.seq != self.seq || p.deps != self.deps {
            // The first vote only refines the payload; the coordinator's
            // own pre-accept is still malleable at that point. Any later
            // divergence burns the fast path for good.
            if self.info.pre_accept_reply_count > 1 {
                self.info.same_pre_accept_replies = false;
            }
            self.seq = cmp::max(self.seq, p.seq);
            self.deps.union(&p.deps);
        }

        let votes = self.info.pre_accept_reply_count + self.info.pre_accept_ok_count;
        if votes >= r.fast_quorum() - 1 && self.info.same_pre_accept_replies {
            return self.commit_as_coordinator(r, "fast");
        }
        if self.info.pre_accept_reply_count >= r.quorum() - 1
            && !self.info.same_pre_accept_replies
        {
            return self.accept_as_coordinator(r);
        }
        Action::NoAction
    }

    fn handle_pre_accept_ok(&mut self, r: &Replica) -> Action {
        self.check_status(&[InstanceStatus::PreAccepted]);
        self.info.pre_accept_ok_count += 1;

        let votes = self.info.pre_accept_reply_count + self.info.pre_accept_ok_count;
        if votes >= r.fast_quorum() - 1 && self.info.same_pre_accept_replies {
            return self.commit_as_coordinator(r, "fast");
        }
        // An ok vote endorses the payload as originally broadcast. Once a
        // full reply has refined it, mixed evidence can only close the
        // round through the accept phase.
        if votes >= r.quorum() - 1 && self.info.pre_accept_reply_count > 0 {
            return self.accept_as_coordinator(r);
        }
        Action::NoAction
    }

    fn handle_accept_reply(&mut self, r: &Replica, a: AcceptReply) -> Action {
        self.check_status(&[InstanceStatus::Accepted]);
        assert!(a.ballot >= self.ballot, "stale accept-reply reached a handler");
        if !a.ok {
            if a.ballot > self.ballot {
                self.ballot = a.ballot;
                debug!(r.logger(), "accept nacked, stepping down";
                    "row" => self.row_id, "id" => self.id, "ballot" => %self.ballot);
                return Action::NoAction;
            }
            panic!(
                "negative accept-reply at instance ({}, {}) carrying our own ballot",
                self.row_id, self.id
            );
        }
        if a.ballot > self.ballot {
            panic!(
                "positive accept-reply at instance ({}, {}) from future ballot {}",
                self.row_id, self.id, a.ballot
            );
        }
        self.info.accept_reply_count += 1;
        if self.info.accept_reply_count >= r.quorum() - 1 {
            return self.commit_as_coordinator(r, "slow");
        }
        Action::NoAction
    }

    // ---------------------------------------------------------------
    // recovery
    // ---------------------------------------------------------------

    /// Opens a prepare round on an unresolved instance: snapshots the
    /// current state, moves to a strictly larger ballot owned by this
    /// replica, and asks everyone what they know.
    pub fn enter_preparing(&mut self, r: &Replica) -> Action {
        self.check_status(&[
            InstanceStatus::Nil,
            InstanceStatus::PreAccepted,
            InstanceStatus::Accepted,
            InstanceStatus::Preparing,
        ]);
        // A repeated timeout keeps the original pre-recovery snapshot.
        let (former_status, former_ballot) = if self.status == InstanceStatus::Preparing {
            (self.recovery.former_status, self.recovery.former_ballot)
        } else {
            (self.status, self.ballot)
        };
        self.recovery = RecoveryInfo {
            // The opening candidate is whatever this replica holds itself.
            status: former_status,
            ballot: Ballot::initial(r.epoch(), self.row_id),
            cmds: self.cmds.clone(),
            seq: self.seq,
            deps: self.deps.clone(),
            former_status,
            former_ballot,
            reply_count: 0,
            identical_count: 0,
        };
        self.status = InstanceStatus::Preparing;
        let epoch = cmp::max(self.ballot.epoch(), r.epoch());
        self.ballot = Ballot::new(epoch, self.ballot.number() + 1, r.id());
        info!(r.logger(), "entering recovery";
            "row" => self.row_id, "id" => self.id,
            "former" => %former_status, "ballot" => %self.ballot);
        Action::Broadcast(Message::Prepare(Prepare::of(self)))
    }

    fn handle_prepare_reply(&mut self, r: &Replica, p: PrepareReply) -> Action {
        self.check_status(&[InstanceStatus::Preparing]);
        assert_eq!(p.ballot, self.ballot, "prepare-reply off our round");

        self.recovery.reply_count += 1;
        self.merge_prepare_reply(&p);

        match self.recovery.status {
            // Someone already knows the outcome. Spread it.
            InstanceStatus::Committed => {
                self.load_recovered_payload();
                self.status = InstanceStatus::Committed;
                debug!(r.logger(), "recovery found a commit";
                    "row" => self.row_id, "id" => self.id);
                Action::Broadcast(Message::Commit(Commit::of(self)))
            }
            InstanceStatus::Accepted if self.recovery.reply_count >= r.quorum() - 1 => {
                self.load_recovered_payload();
                self.enter_accepted_as_coordinator();
                debug!(r.logger(), "recovery resumes at accept";
                    "row" => self.row_id, "id" => self.id);
                Action::Broadcast(Message::Accept(Accept::of(self)))
            }
            // Enough identical non-leader sightings of the initial
            // pre-accept prove the fast path could have fired, but a
            // recovering replica has no fast-path authority: it must run
            // the accept phase over that payload.
            InstanceStatus::PreAccepted
                if self.recovery.identical_count >= r.quorum() - 1 =>
            {
                self.load_recovered_payload();
                self.enter_accepted_as_coordinator();
                debug!(r.logger(), "recovery re-proposes identical pre-accepts";
                    "row" => self.row_id, "id" => self.id);
                Action::Broadcast(Message::Accept(Accept::of(self)))
            }
            _ if self.recovery.reply_count >= r.quorum() - 1 => {
                // Nothing decided anywhere. Run the first phase again with
                // whatever command is known, a no-op batch otherwise.
                self.load_recovered_payload();
                self.enter_pre_accepted();
                debug!(r.logger(), "recovery restarts pre-accept";
                    "row" => self.row_id, "id" => self.id,
                    "noop" => self.cmds.is_empty());
                Action::Broadcast(Message::PreAccept(PreAccept::of(self)))
            }
            _ => Action::NoAction,
        }
    }

    /// Folds one prepare reply into the candidate. Higher status wins; at
    /// equal status the larger original ballot wins; at full equality only
    /// the identical-vote count can grow.
    fn merge_prepare_reply(&mut self, p: &PrepareReply) {
        if p.status > self.recovery.status {
            self.adopt_prepare_reply(p);
            return;
        }
        if p.status < self.recovery.status {
            return;
        }
        if p.original_ballot > self.recovery.ballot {
            self.adopt_prepare_reply(p);
            return;
        }
        if p.original_ballot < self.recovery.ballot {
            return;
        }
        if self.recovery.status == InstanceStatus::PreAccepted && self.is_identical_vote(p) {
            self.recovery.identical_count += 1;
        }
    }

    fn adopt_prepare_reply(&mut self, p: &PrepareReply) {
        self.recovery.status = p.status;
        self.recovery.ballot = p.original_ballot;
        self.recovery.cmds = p.cmds.clone();
        self.recovery.seq = p.seq;
        self.recovery.deps = p.deps.clone();
        self.recovery.identical_count =
            if p.status == InstanceStatus::PreAccepted && self.is_identical_vote(p) {
                1
            } else {
                0
            };
    }

    /// A reply counts toward the identical quorum only if it comes from a
    /// non-leader peer that saw the original leader's initial pre-accept
    /// unchanged. Those sightings are what make the fast path recoverable.
    fn is_identical_vote(&self, p: &PrepareReply) -> bool {
        !p.is_from_leader
            && p.original_ballot.is_initial()
            && p.original_ballot.replica_id() == self.row_id
            && p.cmds == self.recovery.cmds
            && p.deps == self.recovery.deps
    }

    fn load_recovered_payload(&mut self) {
        self.cmds = self.recovery.cmds.clone();
        self.seq = self.recovery.seq;
        self.deps = self.recovery.deps.clone();
    }

    // ---------------------------------------------------------------
    // rejections and transitions
    // ---------------------------------------------------------------

    fn reject_pre_accept(&self) -> Action {
        Action::Reply(Message::PreAcceptReply(PreAcceptReply::nack(self)))
    }

    fn reject_accept(&self) -> Action {
        Action::Reply(Message::AcceptReply(AcceptReply::nack(self)))
    }

    fn reject_prepare(&self) -> Action {
        Action::Reply(Message::PrepareReply(PrepareReply::nack(self)))
    }

    fn enter_pre_accepted(&mut self) {
        self.status = InstanceStatus::PreAccepted;
        self.info = InstanceInfo::default();
    }

    fn enter_accepted_as_coordinator(&mut self) {
        self.status = InstanceStatus::Accepted;
        self.info.accept_reply_count = 0;
    }

    fn accept_as_coordinator(&mut self, r: &Replica) -> Action {
        self.enter_accepted_as_coordinator();
        debug!(r.logger(), "taking the slow path";
            "row" => self.row_id, "id" => self.id, "seq" => self.seq);
        Action::Broadcast(Message::Accept(Accept::of(self)))
    }

    fn commit_as_coordinator(&mut self, r: &Replica, path: &'static str) -> Action {
        self.status = InstanceStatus::Committed;
        info!(r.logger(), "committed";
            "row" => self.row_id, "id" => self.id,
            "seq" => self.seq, "path" => path);
        Action::Broadcast(Message::Commit(Commit::of(self)))
    }
}
