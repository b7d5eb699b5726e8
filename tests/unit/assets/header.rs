use std::io::Write as _;

use super::*;

fn gzip(text: &str) -> Vec<u8> {
    let mut enc = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(text.as_bytes()).unwrap();
    enc.finish().unwrap()
}

fn zlib(text: &str) -> Vec<u8> {
    let mut enc = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    enc.write_all(text.as_bytes()).unwrap();
    enc.finish().unwrap()
}

#[test]
fn inflates_both_framings() {
    let doc = r#"{"fr":30,"ip":0,"op":60}"#;
    assert_eq!(inflate(&gzip(doc)).unwrap(), doc);
    assert_eq!(inflate(&zlib(doc)).unwrap(), doc);
}

#[test]
fn plain_text_is_a_decompress_error() {
    let err = inflate(br#"{"fr":30}"#).unwrap_err();
    assert!(matches!(err, LottieError::Decompress(_)));
}

#[test]
fn truncated_gzip_is_a_decompress_error() {
    let mut bytes = gzip(r#"{"fr":30,"ip":0,"op":60}"#);
    bytes.truncate(12);
    assert!(matches!(inflate(&bytes), Err(LottieError::Decompress(_))));
}

#[test]
fn decode_asset_reads_header_fields() {
    let data = decode_asset(&gzip(r#"{"v":"5.5.2","fr":29.97,"ip":0,"op":90,"w":512,"h":512,"layers":[]}"#))
        .unwrap();
    assert_eq!(data.header.frame_rate, 29.97);
    assert_eq!(data.header.frame_span(), Some(90));
    assert_eq!(data.header.w, Some(512));
    assert!(data.json.contains("layers"));
}

#[test]
fn missing_frame_rate_is_a_parse_error() {
    let err = decode_asset(&gzip(r#"{"ip":0,"op":10}"#)).unwrap_err();
    assert!(matches!(err, LottieError::Parse(_)));

    let err = decode_asset(&gzip(r#"{"fr":"fast"}"#)).unwrap_err();
    assert!(matches!(err, LottieError::Parse(_)));
}

#[test]
fn frame_span_requires_ordered_points() {
    let h = AnimationHeader::parse(r#"{"fr":60,"ip":10,"op":10}"#).unwrap();
    assert_eq!(h.frame_span(), None);
    let h = AnimationHeader::parse(r#"{"fr":60,"op":10}"#).unwrap();
    assert_eq!(h.frame_span(), None);
    let h = AnimationHeader::parse(r#"{"fr":600,"ip":5,"op":15.5}"#).unwrap();
    assert_eq!(h.frame_span(), Some(10));
    assert_eq!(h.fps().as_f64(), 60.0);
}
