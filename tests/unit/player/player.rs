use super::*;

fn player(options: PlayerOptions, frame_count: u32, fps: f64) -> Player {
    let mut p = Player::new(
        RequestId(1),
        ElementId(1),
        PixelSize::new(1, 1),
        WorkerId {
            generation: 0,
            index: 0,
        },
        options,
    );
    p.playback = Some(Playback::new(
        frame_count,
        Fps::clamped(Some(fps)),
        Duration::ZERO,
    ));
    p
}

fn px(i: u32) -> FramePixels {
    FramePixels::Owned(vec![i as u8, 0, 0, 255])
}

#[test]
fn advance_requests_until_queue_is_full_then_defers() {
    // capacity 8 / 4 = 2
    let mut p = player(PlayerOptions::default(), 10, 8.0);
    assert_eq!(p.accept_frame(0, px(0)), Some(1));
    assert_eq!(p.accept_frame(1, px(1)), None);
    assert_eq!(p.playback.as_ref().unwrap().pending_next, Some(2));

    let (f, next) = p.take_frame(Duration::from_millis(200)).unwrap();
    assert_eq!(f.index, 0);
    assert_eq!(next, Some(2));
    assert_eq!(p.playback.as_ref().unwrap().pending_next, None);
}

#[test]
fn looping_wraps_to_zero_and_resets_timings() {
    let mut p = player(PlayerOptions::default(), 3, 60.0);
    p.timings.push(Duration::from_millis(16));
    assert_eq!(p.accept_frame(0, px(0)), Some(1));
    assert_eq!(p.accept_frame(1, px(1)), Some(2));
    assert_eq!(p.accept_frame(2, px(2)), Some(0));
    assert!(p.timings.is_empty());
}

#[test]
fn play_once_stops_advancing_and_pauses_on_presenting_last_frame() {
    let opts = PlayerOptions {
        play_once: true,
        ..PlayerOptions::default()
    };
    let mut p = player(opts, 2, 60.0);
    assert_eq!(p.accept_frame(0, px(0)), Some(1));
    assert_eq!(p.accept_frame(1, px(1)), None);
    assert!(p.playback.as_ref().unwrap().ended);
    assert!(!p.paused);

    p.take_frame(Duration::from_millis(20)).unwrap();
    assert!(!p.paused);
    p.presented += 1;
    let (last, next) = p.take_frame(Duration::from_millis(40)).unwrap();
    assert_eq!(last.index, 1);
    assert_eq!(next, None);
    assert!(p.paused);
    assert_eq!(p.phase(), PlayerPhase::PausedAtEnd);
}

#[test]
fn frame_then_snaps_to_interval_grid() {
    let mut p = player(PlayerOptions::default(), 10, 25.0);
    p.accept_frame(0, px(0));
    p.take_frame(Duration::from_millis(95)).unwrap();
    let pb = p.playback.as_ref().unwrap();
    assert_eq!(pb.frame_then, Duration::from_millis(80));
    assert!(!pb.is_due(Duration::from_millis(120)));
    assert!(pb.is_due(Duration::from_millis(121)));
}

#[test]
fn retains_only_owned_frames_under_policy() {
    let opts = PlayerOptions {
        caching_module: 2,
        ..PlayerOptions::default()
    };
    let mut p = player(opts, 10, 60.0);
    p.accept_frame(0, px(0));
    p.accept_frame(1, px(1));
    // (1 + 0) % 2 != 0 keeps 0, (1 + 1) % 2 == 0 skips 1
    assert!(p.cache.get(0).is_some());
    assert!(p.cache.get(1).is_none());
}

#[test]
fn resize_restarts_from_first_unpresented_frame() {
    let mut p = player(PlayerOptions::default(), 10, 60.0);
    p.accept_frame(4, px(4));
    p.accept_frame(5, px(5));
    assert_eq!(p.flush_for_resize(PixelSize::new(2, 2)), Some(4));
    let pb = p.playback.as_ref().unwrap();
    assert_eq!(pb.queue.len(), 0);
    assert!(p.scratch.is_none());

    let mut p = player(PlayerOptions::default(), 10, 60.0);
    p.playback.as_mut().unwrap().in_flight = true;
    p.playback.as_mut().unwrap().last_presented = Some(9);
    assert_eq!(p.flush_for_resize(PixelSize::new(2, 2)), None);
    assert_eq!(p.playback.as_ref().unwrap().resume_at, Some(0));
}

#[test]
fn recycle_keeps_matching_allocations_only() {
    let mut p = player(PlayerOptions::default(), 1, 60.0);
    p.scratch = None;
    p.recycle(FramePixels::Owned(vec![0; 8]));
    assert!(p.scratch.is_none());
    p.recycle(FramePixels::Owned(vec![0; 4]));
    assert_eq!(p.scratch.as_ref().map(Vec::len), Some(4));
}

#[test]
fn phases_follow_lifecycle() {
    let mut p = player(PlayerOptions::default(), 1, 60.0);
    assert_eq!(p.phase(), PlayerPhase::Loaded);
    p.presented = 1;
    assert_eq!(p.phase(), PlayerPhase::Running);
    p.paused = true;
    assert_eq!(p.phase(), PlayerPhase::Paused);
    p.dead = true;
    assert_eq!(p.phase(), PlayerPhase::Dead);
    p.playback = None;
    p.dead = false;
    assert_eq!(p.phase(), PlayerPhase::Creating);
}
