mod headless;

use std::time::Duration;

use kurbo::{Rect, Size};

use crate::foundation::core::{ElementId, PixelSize};
use crate::platform::Capabilities;

pub use headless::{HeadlessElement, HeadlessHost};

/// Everything the orchestrator needs from the document it plays into.
///
/// All methods are called on the orchestrator's thread.
pub trait Host {
    /// Monotonic time since an arbitrary, fixed origin.
    fn now(&self) -> Duration;

    /// Capability probe input. Read once, when the orchestrator is created.
    fn capabilities(&self) -> Capabilities;

    /// Whether the document currently has input focus.
    fn document_has_focus(&self) -> bool;

    /// Visible viewport size in CSS pixels.
    fn viewport_size(&self) -> Size;

    /// Element rectangle relative to the viewport, `None` if the element is gone.
    fn bounding_rect(&self, element: ElementId) -> Option<Rect>;

    /// Layout size of the element in CSS pixels.
    fn client_size(&self, element: ElementId) -> Option<Size>;

    /// Device pixels per CSS pixel.
    fn device_pixel_ratio(&self) -> f64;

    /// URL of the element's animation source, if it declares one.
    fn animation_source(&self, element: ElementId) -> Option<String>;

    /// Create the presentation surface inside `element`.
    fn attach_surface(&mut self, element: ElementId, size: PixelSize);

    /// Change the size of an attached surface.
    fn resize_surface(&mut self, element: ElementId, size: PixelSize) {
        self.attach_surface(element, size);
    }

    /// Draw one RGBA8 frame of `size` onto the element's surface.
    fn present(&mut self, element: ElementId, size: PixelSize, pixels: &[u8]);

    /// Remove the static placeholder shown before the first frame.
    fn remove_placeholder(&mut self, _element: ElementId) {}

    /// Drop the presentation surface of a destroyed player.
    fn detach_surface(&mut self, _element: ElementId) {}
}
