use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "tests/command_tests.rs"]
mod tests;

/// Command is an opaque batch element. The engine never interprets it, it
/// only hands pairs of them to the commutativity oracle. An empty batch of
/// commands executes as a no-op.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::From,
)]
pub struct Command(pub Vec<u8>);

pub type Commands = Vec<Command>;

impl From<&str> for Command {
    fn from(s: &str) -> Command {
        Command(s.as_bytes().to_vec())
    }
}

impl Command {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// ConflictOracle decides whether two commands conflict, i.e. do not
/// commute. It must be a pure function of its arguments.
pub trait ConflictOracle {
    fn conflict(&self, a: &Command, b: &Command) -> bool;
}

/// Conservative default for workloads with unknown commutativity: every
/// pair of commands conflicts.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConflict;

impl ConflictOracle for AlwaysConflict {
    fn conflict(&self, _a: &Command, _b: &Command) -> bool {
        true
    }
}

/// True when any command of one batch conflicts with any of the other.
pub fn batches_conflict(oracle: &dyn ConflictOracle, a: &Commands, b: &Commands) -> bool {
    a.iter().any(|x| b.iter().any(|y| oracle.conflict(x, y)))
}
