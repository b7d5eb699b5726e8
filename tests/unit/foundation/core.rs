use super::*;

#[test]
fn fps_clamps_into_range_and_defaults() {
    assert_eq!(Fps::clamped(None).as_f64(), 60.0);
    assert_eq!(Fps::clamped(Some(0.0)).as_f64(), 60.0);
    assert_eq!(Fps::clamped(Some(f64::NAN)).as_f64(), 60.0);
    assert_eq!(Fps::clamped(Some(120.0)).as_f64(), 60.0);
    assert_eq!(Fps::clamped(Some(0.25)).as_f64(), 1.0);
    assert_eq!(Fps::clamped(Some(-5.0)).as_f64(), 1.0);
    assert_eq!(Fps::clamped(Some(29.97)).as_f64(), 29.97);
}

#[test]
fn queue_capacity_rounds_a_quarter_second_up() {
    assert_eq!(Fps::clamped(Some(60.0)).queue_capacity(), 15);
    assert_eq!(Fps::clamped(Some(30.0)).queue_capacity(), 8);
    assert_eq!(Fps::clamped(Some(25.0)).queue_capacity(), 7);
    assert_eq!(Fps::clamped(Some(10.0)).queue_capacity(), 3);
    assert_eq!(Fps::clamped(Some(8.0)).queue_capacity(), 2);
    assert_eq!(Fps::clamped(Some(3.0)).queue_capacity(), 1);
    assert_eq!(Fps::clamped(Some(2.0)).queue_capacity(), 1);
    assert_eq!(Fps::clamped(Some(1.0)).queue_capacity(), 1);
}

#[test]
fn frame_interval_matches_rate() {
    assert_eq!(Fps::clamped(Some(25.0)).frame_interval(), Duration::from_millis(40));
    assert_eq!(Fps::clamped(Some(1.0)).frame_interval(), Duration::from_secs(1));
}

#[test]
fn pixel_size_byte_len() {
    assert_eq!(PixelSize::new(2, 3).byte_len(), 24);
    assert!(PixelSize::new(0, 3).is_empty());
    assert!(!PixelSize::new(1, 1).is_empty());
    assert_eq!(PixelSize::new(512, 256).to_string(), "512x256");
}

#[test]
fn worker_id_display_names_generation_and_slot() {
    let w = WorkerId {
        generation: 2,
        index: 1,
    };
    assert_eq!(w.to_string(), "#2.1");
}
