use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LottieError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(LottieError::fetch("x").to_string().contains("fetch error:"));
    assert!(
        LottieError::decompress("x")
            .to_string()
            .contains("decompress error:")
    );
    assert!(LottieError::parse("x").to_string().contains("parse error:"));
    assert!(LottieError::decode("x").to_string().contains("decode error:"));
    assert!(LottieError::handle("x").to_string().contains("handle error:"));
    assert!(
        LottieError::channel("x")
            .to_string()
            .contains("channel error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LottieError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
