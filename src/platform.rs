/// What the hosting environment can do, as reported by the [`crate::Host`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Isolated parallel execution contexts (worker threads) are available.
    pub parallel_workers: bool,
    /// The decode module's binary format can run off the main thread.
    pub binary_execution: bool,
    /// Raw pixel buffers and image-data surfaces are available.
    pub pixel_buffers: bool,
    /// Engine identification string, if any.
    pub user_agent: Option<String>,
}

impl Capabilities {
    /// Capabilities of a native process: everything available, no user agent.
    pub fn native() -> Self {
        Self {
            parallel_workers: true,
            binary_execution: true,
            pixel_buffers: true,
            user_agent: None,
        }
    }

    /// Capabilities of an environment that cannot run the decoder at all.
    pub fn unsupported() -> Self {
        Self {
            parallel_workers: false,
            binary_execution: false,
            pixel_buffers: false,
            user_agent: None,
        }
    }

    /// Same capabilities with a user agent attached.
    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::native()
    }
}

/// How pixel buffers cross the decode channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferMode {
    /// The worker copies into a fresh allocation; no buffer travels with the request.
    Copy,
    /// The caller's scratch buffer is moved to the worker and moved back filled.
    Transfer,
}

/// Rendering engine family, as far as playback policy cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineClass {
    /// Safari and every iOS browser.
    WebKit,
    /// Everything else, including native hosts.
    Other,
}

fn has_word(haystack: &str, word: &str) -> bool {
    haystack.match_indices(word).any(|(at, _)| {
        let before = haystack[..at].chars().next_back();
        let after = haystack[at + word.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Classify a user agent string.
pub fn engine_class(user_agent: &str) -> EngineClass {
    let ios = ["iPad", "iPhone", "iPod"]
        .iter()
        .any(|w| has_word(user_agent, w));
    let safari = user_agent.contains("Safari") && !user_agent.contains("Chrome");
    if ios || safari {
        EngineClass::WebKit
    } else {
        EngineClass::Other
    }
}

/// Immutable playback policy, resolved once from [`Capabilities`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlatformPolicy {
    /// All required capabilities are present.
    pub supported: bool,
    /// Pixel buffer crossing mode.
    pub buffer_mode: BufferMode,
    /// Prefer paint callbacks over short timers.
    pub paint_synced: bool,
}

impl PlatformPolicy {
    /// Resolve the policy.
    pub fn detect(caps: &Capabilities) -> Self {
        let supported = caps.parallel_workers && caps.binary_execution && caps.pixel_buffers;
        let engine = caps
            .user_agent
            .as_deref()
            .map(engine_class)
            .unwrap_or(EngineClass::Other);

        let policy = match engine {
            EngineClass::WebKit => Self {
                supported,
                buffer_mode: BufferMode::Copy,
                paint_synced: true,
            },
            EngineClass::Other => Self {
                supported,
                buffer_mode: BufferMode::Transfer,
                paint_synced: false,
            },
        };
        tracing::debug!(?engine, ?policy, "platform policy resolved");
        policy
    }
}

#[cfg(test)]
#[path = "../tests/unit/platform.rs"]
mod tests;
