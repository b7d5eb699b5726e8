use std::sync::mpsc;

use super::*;

fn worker() -> WorkerId {
    WorkerId {
        generation: 0,
        index: 0,
    }
}

#[test]
fn copy_mode_strips_render_buffers() {
    let (tx, rx) = mpsc::channel();
    let ch = DecodeChannel::new(worker(), tx, BufferMode::Copy);
    ch.call(Request::Render {
        req_id: RequestId(1),
        frame: 3,
        buffer: Some(vec![0; 16]),
    });
    match rx.recv().unwrap() {
        Request::Render { frame, buffer, .. } => {
            assert_eq!(frame, 3);
            assert!(buffer.is_none());
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn transfer_mode_moves_buffers_and_keeps_fifo_order() {
    let (tx, rx) = mpsc::channel();
    let ch = DecodeChannel::new(worker(), tx, BufferMode::Transfer);
    ch.call(Request::Load {
        req_id: RequestId(1),
        url: "a.tgs".to_string(),
        size: PixelSize::new(2, 2),
    });
    ch.call(Request::Render {
        req_id: RequestId(1),
        frame: 0,
        buffer: Some(vec![7; 16]),
    });
    ch.call(Request::Destroy {
        req_id: RequestId(1),
    });

    let methods: Vec<_> = rx.try_iter().map(|r| (r.method(), r)).collect();
    assert_eq!(
        methods.iter().map(|(m, _)| *m).collect::<Vec<_>>(),
        ["load", "render", "destroy"]
    );
    match &methods[1].1 {
        Request::Render { buffer, .. } => assert_eq!(buffer.as_deref(), Some(&[7u8; 16][..])),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn call_on_closed_channel_does_not_panic() {
    let (tx, rx) = mpsc::channel();
    drop(rx);
    let ch = DecodeChannel::new(worker(), tx, BufferMode::Transfer);
    ch.call(Request::Destroy {
        req_id: RequestId(9),
    });
}

#[test]
fn scratch_is_reallocated_when_missing_or_resized() {
    let mut slot = None;
    assert_eq!(take_scratch(&mut slot, 8).len(), 8);

    slot = Some(vec![1; 8]);
    let reused = take_scratch(&mut slot, 8);
    assert_eq!(reused, vec![1; 8]);
    assert!(slot.is_none());

    slot = Some(vec![1; 4]);
    assert_eq!(take_scratch(&mut slot, 8), vec![0; 8]);

    slot = Some(Vec::new());
    assert_eq!(take_scratch(&mut slot, 0).len(), 0);
}
