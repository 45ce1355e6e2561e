#![allow(unused_macros)]

/// cmds! builds a command batch from string literals.
macro_rules! cmds {
    [$($c:expr),*] => {
        vec![$(crate::command::Command::from($c)),*]
    }
}

/// deps! builds a Dependencies vector from per-row instance ids.
macro_rules! deps {
    [$($idx:expr),*] => {
        crate::epaxos::Dependencies::from(vec![$($idx as crate::epaxos::InstanceId),*])
    }
}
