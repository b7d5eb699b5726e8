use std::time::Duration;

use super::*;
use crate::foundation::core::{Fps, PixelSize, WorkerId};
use crate::player::Playback;
use crate::player::options::PlayerOptions;

fn player(reg: &mut Registry, element: u64) -> Player {
    Player::new(
        reg.mint(),
        ElementId(element),
        PixelSize::new(1, 1),
        WorkerId {
            generation: 0,
            index: 0,
        },
        PlayerOptions::default(),
    )
}

#[test]
fn ids_are_monotonic_and_never_reused() {
    let mut reg = Registry::new();
    let a = player(&mut reg, 10);
    let a_id = a.req_id;
    reg.insert(a);
    reg.remove(a_id).unwrap();
    let b = player(&mut reg, 10);
    assert_eq!(a_id, RequestId(1));
    assert_eq!(b.req_id, RequestId(2));
}

#[test]
fn element_lookup_follows_insert_and_remove() {
    let mut reg = Registry::new();
    let p = player(&mut reg, 7);
    let id = p.req_id;
    reg.insert(p);
    assert_eq!(reg.by_element(ElementId(7)), Some(id));
    assert!(reg.get(id).is_some());
    assert!(reg.remove(id).is_some());
    assert!(reg.remove(id).is_none());
    assert_eq!(reg.by_element(ElementId(7)), None);
    assert_eq!(reg.len(), 0);
}

#[test]
fn has_loaded_tracks_metadata() {
    let mut reg = Registry::new();
    let p = player(&mut reg, 1);
    let id = p.req_id;
    reg.insert(p);
    assert!(!reg.has_loaded());
    reg.get_mut(id).unwrap().playback =
        Some(Playback::new(3, Fps::clamped(None), Duration::ZERO));
    assert!(reg.has_loaded());
    assert_eq!(reg.drain().len(), 1);
    assert!(!reg.has_loaded());
    assert_eq!(reg.by_element(ElementId(1)), None);
}

#[test]
fn iteration_is_in_creation_order() {
    let mut reg = Registry::new();
    for el in [5, 3, 9] {
        let p = player(&mut reg, el);
        reg.insert(p);
    }
    assert_eq!(reg.ids(), vec![RequestId(1), RequestId(2), RequestId(3)]);
}
