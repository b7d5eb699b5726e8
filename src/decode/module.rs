use std::sync::Arc;

use crate::foundation::error::LottieResult;

/// Module-side identifier of one loaded animation instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModuleHandle(pub u32);

/// Entry points of the vector rasterizer.
///
/// Each decode worker owns exactly one module and calls it from its own thread only. Handles are
/// never shared between modules.
pub trait DecodeModule {
    /// Allocate a new, empty instance.
    fn create(&mut self) -> LottieResult<ModuleHandle>;

    /// Load animation JSON into `handle`, returning its frame count.
    fn load(&mut self, handle: ModuleHandle, json: &str) -> LottieResult<u32>;

    /// Set the output size in pixels.
    fn resize(&mut self, handle: ModuleHandle, width: u32, height: u32) -> LottieResult<()>;

    /// Rasterize `frame` into the instance's frame buffer.
    fn render(&mut self, handle: ModuleHandle, frame: u32) -> LottieResult<()>;

    /// RGBA8 pixels of the last rendered frame, `width * height * 4` bytes, valid until the next
    /// [`DecodeModule::render`] call on the same handle.
    fn frame_buffer(&self, handle: ModuleHandle) -> LottieResult<&[u8]>;

    /// Free the instance. Unknown handles are ignored.
    fn destroy(&mut self, handle: ModuleHandle);
}

/// Builds one [`DecodeModule`] per worker, on the worker's own thread.
pub type ModuleFactory = Arc<dyn Fn() -> Box<dyn DecodeModule> + Send + Sync>;

/// Wrap a constructor closure as a [`ModuleFactory`].
pub fn module_factory<M, F>(make: F) -> ModuleFactory
where
    M: DecodeModule + 'static,
    F: Fn() -> M + Send + Sync + 'static,
{
    Arc::new(move || Box::new(make()) as Box<dyn DecodeModule>)
}
