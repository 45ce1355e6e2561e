use std::ops::{Deref, Index, IndexMut};

use serde::{Deserialize, Serialize};

use super::{InstanceId, ReplicaId};

/// Dependencies is a fixed-length vector with one slot per replica row.
/// deps[r] is the highest instance id in row r the command conflicts with,
/// 0 meaning no dependency in that row.
///
/// Dependencies are value types. They are copied into an instance whenever
/// stored and never share storage across instances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dependencies {
    ids: Vec<InstanceId>,
}

impl Dependencies {
    pub fn with_rows(n: usize) -> Dependencies {
        Dependencies { ids: vec![0; n] }
    }

    pub fn rows(&self) -> usize {
        self.ids.len()
    }

    /// Element-wise max. Both sides must cover the same group.
    pub fn union(&mut self, other: &Dependencies) {
        assert_eq!(
            self.ids.len(),
            other.ids.len(),
            "dependency vectors of different groups"
        );
        for (mine, theirs) in self.ids.iter_mut().zip(other.ids.iter()) {
            if *theirs > *mine {
                *mine = *theirs;
            }
        }
    }
}

/// Let callers use slice methods directly.
impl Deref for Dependencies {
    type Target = [InstanceId];
    fn deref(&self) -> &[InstanceId] {
        &self.ids
    }
}

/// Let callers use deps[replica_id] to read a row's dependency.
impl Index<ReplicaId> for Dependencies {
    type Output = InstanceId;
    fn index(&self, rid: ReplicaId) -> &InstanceId {
        &self.ids[rid as usize]
    }
}

impl IndexMut<ReplicaId> for Dependencies {
    fn index_mut(&mut self, rid: ReplicaId) -> &mut InstanceId {
        &mut self.ids[rid as usize]
    }
}

impl From<Vec<InstanceId>> for Dependencies {
    fn from(ids: Vec<InstanceId>) -> Dependencies {
        Dependencies { ids }
    }
}

impl From<&[InstanceId]> for Dependencies {
    fn from(ids: &[InstanceId]) -> Dependencies {
        Dependencies { ids: ids.to_vec() }
    }
}

macro_rules! impl_deps_from_arr {
    ($n:expr) => {
        impl From<[InstanceId; $n]> for Dependencies {
            fn from(ids: [InstanceId; $n]) -> Dependencies {
                Dependencies { ids: ids.to_vec() }
            }
        }
    };
}

impl_deps_from_arr!(1);
impl_deps_from_arr!(2);
impl_deps_from_arr!(3);
impl_deps_from_arr!(4);
impl_deps_from_arr!(5);
impl_deps_from_arr!(6);
impl_deps_from_arr!(7);
impl_deps_from_arr!(8);
