use crate::foundation::error::{LottieError, LottieResult};

/// Per-element playback options, deserialized from the camelCase option bag.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerOptions {
    /// Upper bound for the device pixel ratio used to size the surface.
    pub max_device_ratio: Option<f64>,
    /// Frame-retention modulus; `0` disables the frame cache.
    #[serde(alias = "cachingModulo")]
    pub caching_module: u32,
    /// Stop on the last frame instead of looping.
    pub play_once: bool,
    /// Render regardless of focus, pause state and visibility.
    pub force_render: bool,
}

impl PlayerOptions {
    /// Parse an option bag such as `{"playOnce":true,"cachingModule":3}`.
    pub fn from_json(json: &str) -> LottieResult<Self> {
        let opts: Self = serde_json::from_str(json)
            .map_err(|e| LottieError::validation(format!("player options: {e}")))?;
        if let Some(r) = opts.max_device_ratio
            && !(r.is_finite() && r > 0.0)
        {
            return Err(LottieError::validation(format!(
                "maxDeviceRatio must be a positive number, got {r}"
            )));
        }
        Ok(opts)
    }

    /// Effective device ratio given the host's actual one.
    pub fn device_ratio(&self, host_ratio: f64) -> f64 {
        let host_ratio = if host_ratio.is_finite() && host_ratio > 0.0 {
            host_ratio
        } else {
            1.0
        };
        match self.max_device_ratio {
            Some(max) if max.is_finite() && max > 0.0 => host_ratio.min(max),
            _ => host_ratio,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/player/options.rs"]
mod tests;
