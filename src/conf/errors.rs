use crate::epaxos::ReplicaId;

quick_error! {
    #[derive(Debug)]
    pub enum ConfError {
        Io(err: std::io::Error) {
            from()
            display("io error: {}", err)
        }

        Yaml(err: serde_yaml::Error) {
            from()
            display("yaml error: {}", err)
        }

        Addr(err: std::net::AddrParseError) {
            from()
            display("bad replication address: {}", err)
        }

        OrphanReplica(rid: ReplicaId, node: String) {
            display("replica {} placed on unknown node: {}", rid, node)
        }
    }
}
