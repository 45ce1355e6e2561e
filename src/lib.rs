#[macro_use]
extern crate quick_error;

#[macro_use]
extern crate slog;

#[macro_use]
mod testutil;

pub mod command;
pub mod conf;
pub mod epaxos;
pub mod instance;
pub mod replica;

pub use command::{Command, Commands, ConflictOracle};
pub use epaxos::{Action, Ballot, Dependencies, InstanceId, Message, ReplicaId, Seq};
pub use instance::{Instance, InstanceStatus};
pub use replica::{Param, Replica, ReplicaError};
