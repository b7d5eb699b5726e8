use std::io::Read as _;

use crate::foundation::error::{LottieError, LottieResult};

/// The handful of top-level animation fields the player needs.
///
/// Everything else in the document is opaque and only meaningful to the decode module.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct AnimationHeader {
    /// Declared frame rate.
    #[serde(rename = "fr")]
    pub frame_rate: f64,
    /// In point (first frame).
    #[serde(default)]
    pub ip: Option<f64>,
    /// Out point (one past the last frame).
    #[serde(default)]
    pub op: Option<f64>,
    /// Composition width.
    #[serde(default)]
    pub w: Option<u32>,
    /// Composition height.
    #[serde(default)]
    pub h: Option<u32>,
}

impl AnimationHeader {
    /// Parse the header out of a full animation document.
    pub fn parse(json: &str) -> LottieResult<Self> {
        serde_json::from_str(json).map_err(|e| LottieError::parse(format!("animation json: {e}")))
    }

    /// Declared frame rate after clamping.
    pub fn fps(&self) -> crate::Fps {
        crate::Fps::clamped(Some(self.frame_rate))
    }

    /// Number of frames between the in and out points, when both are present and ordered.
    pub fn frame_span(&self) -> Option<u32> {
        let (ip, op) = (self.ip?, self.op?);
        if !ip.is_finite() || !op.is_finite() || op <= ip {
            return None;
        }
        Some((op - ip).floor() as u32)
    }
}

/// Decompressed and validated animation document.
#[derive(Clone, Debug)]
pub struct AnimationData {
    /// Full JSON text, handed unchanged to the decode module.
    pub json: String,
    /// Parsed header.
    pub header: AnimationHeader,
}

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

fn is_zlib(bytes: &[u8]) -> bool {
    match bytes {
        [cmf, flg, ..] => cmf & 0x0f == 8 && ((u16::from(*cmf) << 8) | u16::from(*flg)) % 31 == 0,
        _ => false,
    }
}

/// Inflate a gzip- or zlib-framed payload into text.
pub fn inflate(bytes: &[u8]) -> LottieResult<String> {
    let mut out = String::new();
    let res = if bytes.starts_with(&GZIP_MAGIC) {
        flate2::read::GzDecoder::new(bytes).read_to_string(&mut out)
    } else if is_zlib(bytes) {
        flate2::read::ZlibDecoder::new(bytes).read_to_string(&mut out)
    } else {
        return Err(LottieError::decompress("unrecognized compression framing"));
    };
    res.map_err(|e| LottieError::decompress(e.to_string()))?;
    Ok(out)
}

/// Decompress and parse a fetched asset.
pub fn decode_asset(bytes: &[u8]) -> LottieResult<AnimationData> {
    let json = inflate(bytes)?;
    let header = AnimationHeader::parse(&json)?;
    Ok(AnimationData { json, header })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/header.rs"]
mod tests;
