use super::*;

struct KeyPrefixConflict;

impl ConflictOracle for KeyPrefixConflict {
    fn conflict(&self, a: &Command, b: &Command) -> bool {
        !a.as_bytes().is_empty()
            && !b.as_bytes().is_empty()
            && a.as_bytes()[0] == b.as_bytes()[0]
    }
}

#[test]
fn test_command_from() {
    let c = Command::from("hello");
    assert_eq!(c.as_bytes(), b"hello");

    let c = Command::from(vec![1u8, 2, 3]);
    assert_eq!(c.as_bytes(), &[1, 2, 3]);
}

#[test]
fn test_cmds_macro() {
    let cmds = cmds!["a", "b"];
    assert_eq!(cmds, vec![Command::from("a"), Command::from("b")]);
}

#[test]
fn test_always_conflict() {
    let o = AlwaysConflict;
    assert!(o.conflict(&Command::from("a"), &Command::from("b")));
}

#[test]
fn test_batches_conflict() {
    let o = KeyPrefixConflict;
    let ab = cmds!["apple", "banana"];
    let bc = cmds!["berry", "cherry"];
    let cd = cmds!["cherry", "date"];

    assert!(batches_conflict(&o, &ab, &bc)); // banana vs berry
    assert!(!batches_conflict(&o, &ab, &cd));
    assert!(batches_conflict(&o, &bc, &cd)); // cherry vs cherry

    // empty batches conflict with nothing
    assert!(!batches_conflict(&o, &Commands::default(), &ab));
}
