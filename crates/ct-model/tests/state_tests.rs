use ct_ir::types::PVPair;
use ct_model::{Assignment, Slot};

#[test]
fn test_builder_sets_slots() {
    let a = Assignment::new().with(2, 1).with_invalid(0);
    assert_eq!(a.get(0), Some(Slot::Invalid));
    assert_eq!(a.get(1), None);
    assert_eq!(a.get(2), Some(Slot::Value(1)));
    assert_eq!(a.get(10), None);
    assert_eq!(a.len(), 2);
}

#[test]
fn test_from_pairs_and_realizes() {
    let pairs = [PVPair::new(0, 1), PVPair::new(3, 0)];
    let a = Assignment::from_pairs(&pairs);
    assert!(a.realizes(&pairs));
    assert!(a.realizes(&[PVPair::new(3, 0)]));
    assert!(!a.realizes(&[PVPair::new(0, 0)]));
    assert!(!a.realizes(&[PVPair::new(1, 0)]));
}

#[test]
fn test_invalid_slot_realizes_nothing() {
    let a = Assignment::new().with_invalid(0);
    assert_eq!(a.value_id(0), None);
    assert!(!a.realizes(&[PVPair::new(0, 0)]));
}

#[test]
fn test_unset_clears_slot() {
    let mut a = Assignment::new().with(1, 4);
    a.set(1, Slot::Value(2));
    assert_eq!(a.value_id(1), Some(2));
    a.unset(1);
    a.unset(7);
    assert!(a.is_empty());
}
