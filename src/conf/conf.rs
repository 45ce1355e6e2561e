use std::collections::BTreeMap;
use std::fs;
use std::net::SocketAddr;
use std::ops::{Deref, DerefMut};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::ConfError;
use crate::epaxos::ReplicaId;

#[cfg(test)]
#[path = "tests/conf_tests.rs"]
mod tests;

/// NodeId is the global identity of a service process. A physical server
/// may run several nodes, and a node may serve one or more replicas.
pub type NodeId = String;

/// Node is one cluster process, not necessarily a replica.
#[derive(Serialize, Deserialize, Debug, Eq, PartialEq)]
pub struct Node {
    #[serde(default)]
    pub node_id: NodeId,
    pub api_addr: SocketAddr,
    /// Where peers reach this node for replication traffic. Filled in from
    /// the node key when omitted in the yaml.
    #[serde(default)]
    pub replication: Option<SocketAddr>,
}

/// ClusterInfo describes a whole group: which nodes exist and which
/// replica lives where. The key of `nodes` doubles as the default
/// replication address.
#[derive(Serialize, Deserialize, Debug)]
pub struct ClusterInfo {
    pub nodes: BTreeMap<String, Node>,
    pub replicas: BTreeMap<ReplicaId, NodeId>,
}

/// Let callers use c.get() just like c.nodes.get().
impl Deref for ClusterInfo {
    type Target = BTreeMap<String, Node>;
    fn deref(&self) -> &Self::Target {
        &self.nodes
    }
}

impl DerefMut for ClusterInfo {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.nodes
    }
}

impl ClusterInfo {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<ClusterInfo, ConfError> {
        let content = fs::read_to_string(path)?;
        ClusterInfo::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<ClusterInfo, ConfError> {
        let mut cluster: ClusterInfo = serde_yaml::from_str(content)?;

        for (nid, node) in cluster.nodes.iter_mut() {
            ClusterInfo::norm_node(nid, node)?;
        }

        cluster.check_replicas()?;

        Ok(cluster)
    }

    /// The size of the replica group this cluster runs.
    pub fn group_size(&self) -> usize {
        self.replicas.len()
    }

    /// The node a replica lives on.
    pub fn get_replica_node(&self, rid: ReplicaId) -> Option<&Node> {
        let nid = self.replicas.get(&rid)?;
        self.nodes.get(nid)
    }

    fn norm_node(nid: &str, node: &mut Node) -> Result<(), ConfError> {
        node.node_id = String::from(nid);
        if node.replication.is_none() {
            node.replication = Some(nid.parse()?);
        }
        Ok(())
    }

    /// Rejects a replica placed on a node nobody declared.
    fn check_replicas(&self) -> Result<(), ConfError> {
        for (rid, nid) in self.replicas.iter() {
            if !self.nodes.contains_key(nid) {
                return Err(ConfError::OrphanReplica(*rid, nid.clone()));
            }
        }
        Ok(())
    }
}
