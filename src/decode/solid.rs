use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::assets::header::AnimationHeader;
use crate::decode::module::{DecodeModule, ModuleHandle};
use crate::foundation::error::{LottieError, LottieResult};

/// Call counters shared between a [`SolidModule`] and whoever observes it.
#[derive(Debug, Default)]
pub struct SolidStats {
    loads: AtomicUsize,
    renders: AtomicUsize,
    destroys: AtomicUsize,
    rendered: Mutex<Vec<u32>>,
}

impl SolidStats {
    /// Fresh shared counters.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Successful `load` calls.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// `render` calls, including failed ones.
    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    /// `destroy` calls on live handles.
    pub fn destroys(&self) -> usize {
        self.destroys.load(Ordering::SeqCst)
    }

    /// Frame indices passed to `render`, in call order.
    pub fn rendered_frames(&self) -> Vec<u32> {
        match self.rendered.lock() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record_render(&self, frame: u32) {
        self.renders.fetch_add(1, Ordering::SeqCst);
        let mut g = match self.rendered.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        g.push(frame);
    }
}

struct Instance {
    frame_count: Option<u32>,
    buffer: Vec<u8>,
}

/// Reference rasterizer: every pixel of frame `i` is `[i, i >> 8, i >> 16, 255]`.
///
/// The frame count is the animation's `op - ip`. Useful wherever the scheduling core has to run
/// without a real vector engine; [`SolidModule::frame_index`] recovers the index from pixels.
#[derive(Default)]
pub struct SolidModule {
    instances: HashMap<u32, Instance>,
    next: u32,
    stats: Option<Arc<SolidStats>>,
    fail_render_at: Option<u32>,
}

impl SolidModule {
    /// Module without instrumentation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report calls into `stats`.
    pub fn with_stats(mut self, stats: Arc<SolidStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    /// Make every `render` of `frame` fail.
    pub fn fail_render_at(mut self, frame: u32) -> Self {
        self.fail_render_at = Some(frame);
        self
    }

    /// Pixel value encoding `frame`.
    pub fn pixel_for(frame: u32) -> [u8; 4] {
        [frame as u8, (frame >> 8) as u8, (frame >> 16) as u8, 255]
    }

    /// Recover the frame index from the first pixel of a frame produced by this module.
    pub fn frame_index(pixels: &[u8]) -> Option<u32> {
        match pixels {
            [r, g, b, 255, ..] => Some(u32::from(*r) | (u32::from(*g) << 8) | (u32::from(*b) << 16)),
            _ => None,
        }
    }

    fn instance(&mut self, handle: ModuleHandle) -> LottieResult<&mut Instance> {
        self.instances
            .get_mut(&handle.0)
            .ok_or_else(|| LottieError::handle(format!("unknown module handle {}", handle.0)))
    }
}

impl DecodeModule for SolidModule {
    fn create(&mut self) -> LottieResult<ModuleHandle> {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        self.instances.insert(
            id,
            Instance {
                frame_count: None,
                buffer: Vec::new(),
            },
        );
        Ok(ModuleHandle(id))
    }

    fn load(&mut self, handle: ModuleHandle, json: &str) -> LottieResult<u32> {
        let header = AnimationHeader::parse(json)?;
        let frame_count = header
            .frame_span()
            .ok_or_else(|| LottieError::decode("animation has no usable ip/op range"))?;
        self.instance(handle)?.frame_count = Some(frame_count);
        if let Some(stats) = &self.stats {
            stats.loads.fetch_add(1, Ordering::SeqCst);
        }
        Ok(frame_count)
    }

    fn resize(&mut self, handle: ModuleHandle, width: u32, height: u32) -> LottieResult<()> {
        self.instance(handle)?.buffer = vec![0; (width as usize) * (height as usize) * 4];
        Ok(())
    }

    fn render(&mut self, handle: ModuleHandle, frame: u32) -> LottieResult<()> {
        if let Some(stats) = &self.stats {
            stats.record_render(frame);
        }
        if self.fail_render_at == Some(frame) {
            return Err(LottieError::decode(format!("render of frame {frame} failed")));
        }

        let inst = self.instance(handle)?;
        let frame_count = inst
            .frame_count
            .ok_or_else(|| LottieError::decode("render before load"))?;
        if frame >= frame_count {
            return Err(LottieError::decode(format!(
                "frame {frame} out of range 0..{frame_count}"
            )));
        }
        let px = Self::pixel_for(frame);
        for chunk in inst.buffer.chunks_exact_mut(4) {
            chunk.copy_from_slice(&px);
        }
        Ok(())
    }

    fn frame_buffer(&self, handle: ModuleHandle) -> LottieResult<&[u8]> {
        self.instances
            .get(&handle.0)
            .map(|i| i.buffer.as_slice())
            .ok_or_else(|| LottieError::handle(format!("unknown module handle {}", handle.0)))
    }

    fn destroy(&mut self, handle: ModuleHandle) {
        if self.instances.remove(&handle.0).is_some()
            && let Some(stats) = &self.stats
        {
            stats.destroys.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/decode/solid.rs"]
mod tests;
