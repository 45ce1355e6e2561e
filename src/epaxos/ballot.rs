use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Epoch, ReplicaId};

// A ballot is packed into 64 bits for transport:
// Epoch   | Number  | ReplicaId
// 20 bits | 36 bits | 8 bits
const EPOCH_WIDTH: u64 = 20;
const NUMBER_WIDTH: u64 = 36;
const REPLICA_ID_WIDTH: u64 = 8;

const EPOCH_MASK: u64 = ((1 << EPOCH_WIDTH) - 1) << (NUMBER_WIDTH + REPLICA_ID_WIDTH);
const NUMBER_MASK: u64 = ((1 << NUMBER_WIDTH) - 1) << REPLICA_ID_WIDTH;
const REPLICA_ID_MASK: u64 = (1 << REPLICA_ID_WIDTH) - 1;

/// Ballot is the total-ordered round identifier of an instance, compared
/// lexicographically by epoch, then number, then replica id.
///
/// Number 0 marks the initial round. The zero ballot doubles as the
/// "never touched" sentinel of a freshly created instance.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::From,
)]
#[serde(from = "u64", into = "u64")]
pub struct Ballot {
    epoch: Epoch,
    number: u64,
    replica_id: ReplicaId,
}

impl Ballot {
    pub fn new(epoch: Epoch, number: u64, replica_id: ReplicaId) -> Ballot {
        debug_assert!((epoch as u64) < (1 << EPOCH_WIDTH));
        debug_assert!(number < (1 << NUMBER_WIDTH));
        Ballot {
            epoch,
            number,
            replica_id,
        }
    }

    /// The ballot a replica opens an instance of its own row with.
    pub fn initial(epoch: Epoch, replica_id: ReplicaId) -> Ballot {
        Ballot::new(epoch, 0, replica_id)
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn replica_id(&self) -> ReplicaId {
        self.replica_id
    }

    pub fn is_initial(&self) -> bool {
        self.number == 0
    }

    /// Same epoch and owner, one round higher.
    pub fn inc_number(&self) -> Ballot {
        Ballot::new(self.epoch, self.number + 1, self.replica_id)
    }

    /// 64-bit wire form, epoch in the high bits.
    pub fn pack(&self) -> u64 {
        ((self.epoch as u64) << (NUMBER_WIDTH + REPLICA_ID_WIDTH))
            | (self.number << REPLICA_ID_WIDTH)
            | self.replica_id as u64
    }

    pub fn unpack(v: u64) -> Ballot {
        Ballot {
            epoch: ((v & EPOCH_MASK) >> (NUMBER_WIDTH + REPLICA_ID_WIDTH)) as Epoch,
            number: (v & NUMBER_MASK) >> REPLICA_ID_WIDTH,
            replica_id: (v & REPLICA_ID_MASK) as ReplicaId,
        }
    }
}

impl From<u64> for Ballot {
    fn from(v: u64) -> Ballot {
        Ballot::unpack(v)
    }
}

impl From<Ballot> for u64 {
    fn from(b: Ballot) -> u64 {
        b.pack()
    }
}

impl fmt::Display for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {}, {})", self.epoch, self.number, self.replica_id)
    }
}
