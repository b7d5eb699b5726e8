use super::*;

#[test]
fn parses_camel_case_bag_with_defaults() {
    let o = PlayerOptions::from_json(r#"{"playOnce":true,"cachingModule":3}"#).unwrap();
    assert!(o.play_once);
    assert_eq!(o.caching_module, 3);
    assert!(!o.force_render);
    assert_eq!(o.max_device_ratio, None);

    assert_eq!(PlayerOptions::from_json("{}").unwrap(), PlayerOptions::default());
}

#[test]
fn accepts_legacy_modulo_spelling() {
    let o = PlayerOptions::from_json(r#"{"cachingModulo":4,"forceRender":true}"#).unwrap();
    assert_eq!(o.caching_module, 4);
    assert!(o.force_render);
}

#[test]
fn rejects_bad_input() {
    assert!(matches!(
        PlayerOptions::from_json(r#"{"maxDeviceRatio":0}"#),
        Err(LottieError::Validation(_))
    ));
    assert!(matches!(
        PlayerOptions::from_json(r#"{"playOnce":"yes"}"#),
        Err(LottieError::Validation(_))
    ));
}

#[test]
fn device_ratio_is_capped() {
    let o = PlayerOptions {
        max_device_ratio: Some(1.5),
        ..PlayerOptions::default()
    };
    assert_eq!(o.device_ratio(3.0), 1.5);
    assert_eq!(o.device_ratio(1.0), 1.0);
    assert_eq!(PlayerOptions::default().device_ratio(2.0), 2.0);
    assert_eq!(PlayerOptions::default().device_ratio(f64::NAN), 1.0);
}
