use std::io::Write as _;
use std::sync::mpsc;

use super::*;
use crate::assets::source::MemorySource;
use crate::decode::solid::{SolidModule, SolidStats};

fn gzip(text: &str) -> Vec<u8> {
    let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(text.as_bytes()).unwrap();
    enc.finish().unwrap()
}

fn worker_with(module: SolidModule) -> (DecodeWorker, mpsc::Receiver<Inbound>) {
    let source = MemorySource::new()
        .with("ok.tgs", gzip(r#"{"fr":90,"ip":0,"op":5}"#))
        .with("plain.json", br#"{"fr":30,"ip":0,"op":5}"#.to_vec())
        .with("norange.tgs", gzip(r#"{"fr":30}"#));
    let (tx, rx) = mpsc::channel();
    let id = WorkerId {
        generation: 0,
        index: 0,
    };
    (
        DecodeWorker::new(id, Box::new(module), Arc::new(source), tx),
        rx,
    )
}

fn load(w: &mut DecodeWorker, req_id: u64, url: &str) {
    w.handle(Request::Load {
        req_id: RequestId(req_id),
        url: url.to_string(),
        size: PixelSize::new(2, 1),
    });
}

fn render(w: &mut DecodeWorker, req_id: u64, frame: u32, buffer: Option<Vec<u8>>) {
    w.handle(Request::Render {
        req_id: RequestId(req_id),
        frame,
        buffer,
    });
}

#[test]
fn load_replies_frame_count_and_clamped_fps() {
    let (mut w, rx) = worker_with(SolidModule::new());
    load(&mut w, 1, "ok.tgs");
    match rx.try_recv().unwrap().reply {
        Reply::Loaded {
            req_id,
            frame_count,
            fps,
        } => {
            assert_eq!(req_id, RequestId(1));
            assert_eq!(frame_count, 5);
            assert_eq!(fps, 60.0);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(w.live(), 1);
}

#[test]
fn failed_loads_reply_failed_and_host_nothing() {
    let (mut w, rx) = worker_with(SolidModule::new());
    for url in ["missing.tgs", "plain.json", "norange.tgs"] {
        load(&mut w, 1, url);
        match rx.try_recv().unwrap().reply {
            Reply::Failed { stage, .. } => assert_eq!(stage, FailedStage::Load),
            other => panic!("unexpected {other:?} for {url}"),
        }
    }
    assert_eq!(w.live(), 0);
}

#[test]
fn render_fills_transferred_buffer_or_allocates() {
    let (mut w, rx) = worker_with(SolidModule::new());
    load(&mut w, 1, "ok.tgs");
    let _ = rx.try_recv().unwrap();

    render(&mut w, 1, 3, Some(vec![0; 8]));
    render(&mut w, 1, 4, None);
    render(&mut w, 1, 2, Some(vec![0; 3]));

    let frames: Vec<(u32, Vec<u8>)> = rx
        .try_iter()
        .map(|m| match m.reply {
            Reply::Frame { frame, pixels, .. } => (frame, pixels),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(frames.len(), 3);
    for (frame, pixels) in frames {
        assert_eq!(pixels.len(), 8);
        assert_eq!(SolidModule::frame_index(&pixels), Some(frame));
    }
}

#[test]
fn unroutable_and_out_of_range_requests_are_ignored() {
    let (mut w, rx) = worker_with(SolidModule::new());
    render(&mut w, 42, 0, None);
    w.handle(Request::Destroy {
        req_id: RequestId(42),
    });
    w.handle(Request::Resize {
        req_id: RequestId(42),
        size: PixelSize::new(1, 1),
    });

    load(&mut w, 1, "ok.tgs");
    let _ = rx.try_recv().unwrap();
    render(&mut w, 1, 5, None);
    assert!(rx.try_recv().is_err());
}

#[test]
fn render_failure_marks_item_dead() {
    let stats = SolidStats::shared();
    let (mut w, rx) = worker_with(SolidModule::new().with_stats(stats.clone()).fail_render_at(1));
    load(&mut w, 1, "ok.tgs");
    let _ = rx.try_recv().unwrap();

    render(&mut w, 1, 1, None);
    assert!(matches!(
        rx.try_recv().unwrap().reply,
        Reply::Failed {
            stage: FailedStage::Render,
            ..
        }
    ));

    render(&mut w, 1, 0, None);
    assert!(rx.try_recv().is_err());
    assert_eq!(stats.rendered_frames(), vec![1]);
}

#[test]
fn destroy_frees_handle_and_later_requests_are_dropped() {
    let stats = SolidStats::shared();
    let (mut w, rx) = worker_with(SolidModule::new().with_stats(stats.clone()));
    load(&mut w, 1, "ok.tgs");
    load(&mut w, 2, "ok.tgs");
    let _ = rx.try_iter().count();

    w.handle(Request::Destroy {
        req_id: RequestId(1),
    });
    assert_eq!(stats.destroys(), 1);
    assert_eq!(w.live(), 1);

    render(&mut w, 1, 0, None);
    assert!(rx.try_recv().is_err());

    render(&mut w, 2, 0, None);
    assert!(matches!(rx.try_recv().unwrap().reply, Reply::Frame { .. }));
}

#[test]
fn resize_changes_frame_length() {
    let (mut w, rx) = worker_with(SolidModule::new());
    load(&mut w, 1, "ok.tgs");
    let _ = rx.try_recv().unwrap();
    w.handle(Request::Resize {
        req_id: RequestId(1),
        size: PixelSize::new(3, 3),
    });
    render(&mut w, 1, 0, None);
    match rx.try_recv().unwrap().reply {
        Reply::Frame { size, pixels, .. } => {
            assert_eq!(size, PixelSize::new(3, 3));
            assert_eq!(pixels.len(), 36);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn spawned_worker_reports_ready_and_exits_on_close() {
    let (tx, rx) = mpsc::channel();
    let id = WorkerId {
        generation: 3,
        index: 1,
    };
    let factory = crate::decode::module::module_factory(SolidModule::new);
    let (req_tx, join) = spawn(id, factory, Arc::new(MemorySource::new()), tx).unwrap();
    let first = rx.recv().unwrap();
    assert_eq!(first.worker, id);
    assert!(matches!(first.reply, Reply::Ready));
    drop(req_tx);
    join.join().unwrap();
}
