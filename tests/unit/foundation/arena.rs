use super::*;

#[test]
fn removed_handle_is_rejected_after_slot_reuse() {
    let mut arena = HandleArena::new();
    let a = arena.insert("a");
    assert_eq!(arena.remove(a), Some("a"));

    let b = arena.insert("b");
    assert_eq!(arena.get(b), Some(&"b"));
    assert_eq!(arena.get(a), None);
    assert!(arena.get_mut(a).is_none());
    assert_eq!(arena.remove(a), None);
    assert_eq!(arena.len(), 1);
}

#[test]
fn double_remove_is_a_no_op() {
    let mut arena = HandleArena::new();
    let a = arena.insert(1u32);
    let _b = arena.insert(2u32);
    assert_eq!(arena.remove(a), Some(1));
    assert_eq!(arena.remove(a), None);
    assert_eq!(arena.len(), 1);
}

#[test]
fn handles_are_independent() {
    let mut arena = HandleArena::new();
    let a = arena.insert(10u32);
    let b = arena.insert(20u32);
    *arena.get_mut(b).unwrap() += 1;
    assert_eq!(arena.get(a), Some(&10));
    assert_eq!(arena.get(b), Some(&21));
    assert!(arena.contains(a));
    arena.remove(a);
    assert!(!arena.contains(a));
    assert!(arena.contains(b));
}
