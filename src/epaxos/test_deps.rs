use crate::epaxos::Dependencies;

#[test]
fn test_deps_with_rows() {
    let deps = Dependencies::with_rows(5);
    assert_eq!(deps.rows(), 5);
    assert!(deps.iter().all(|id| *id == 0));
}

#[test]
fn test_deps_index() {
    let mut deps = Dependencies::from(vec![1, 2, 3]);
    assert_eq!(deps[0u8], 1);
    assert_eq!(deps[2u8], 3);

    deps[1u8] = 9;
    assert_eq!(deps[1u8], 9);
}

#[test]
fn test_deps_union() {
    let mut deps = Dependencies::from([1, 2, 1, 1, 8]);
    deps.union(&Dependencies::from([0, 1, 2, 3, 4]));
    assert_eq!(deps, Dependencies::from([1, 2, 2, 3, 8]));

    // union with itself changes nothing
    let clone = deps.clone();
    deps.union(&clone);
    assert_eq!(deps, clone);
}

#[test]
#[should_panic(expected = "different groups")]
fn test_deps_union_size_mismatch() {
    let mut deps = Dependencies::from([1, 2]);
    deps.union(&Dependencies::from([1, 2, 3]));
}

#[test]
fn test_deps_eq() {
    assert_eq!(Dependencies::from([1, 2]), Dependencies::from(vec![1, 2]));
    assert_ne!(Dependencies::from([1, 2]), Dependencies::from([2, 1]));
    assert_ne!(Dependencies::from([1, 2]), Dependencies::from([1, 2, 0]));
}

#[test]
fn test_deps_macro() {
    let deps = deps![1, 2, 1, 1, 8];
    assert_eq!(deps, Dependencies::from([1, 2, 1, 1, 8]));
}

#[test]
fn test_deps_wire_form_is_plain_vector() {
    let deps = Dependencies::from([1, 0, 3]);
    let yaml = serde_yaml::to_string(&deps).unwrap();
    let ids: Vec<u64> = serde_yaml::from_str(&yaml).unwrap();
    assert_eq!(ids, vec![1, 0, 3]);
}
