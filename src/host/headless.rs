use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use kurbo::{Rect, Size};

use super::Host;
use crate::foundation::core::{ElementId, PixelSize};
use crate::platform::Capabilities;

#[derive(Clone, Copy, Debug)]
enum Clock {
    Real(Instant),
    Manual(Duration),
}

/// One element of a [`HeadlessHost`] document and what was presented on it.
#[derive(Clone, Debug)]
pub struct HeadlessElement {
    /// Rectangle relative to the viewport.
    pub rect: Rect,
    /// Animation source URL.
    pub source: Option<String>,
    /// Layout size; defaults to the rectangle's size.
    pub client_size: Size,
    /// Attached surface size.
    pub surface: Option<PixelSize>,
    /// Pixels of the most recent frame.
    pub last_frame: Option<Vec<u8>>,
    /// First pixel of every presented frame, in order.
    pub first_pixels: Vec<[u8; 4]>,
    /// The placeholder has not been removed yet.
    pub placeholder: bool,
}

impl HeadlessElement {
    /// Number of frames presented on this element.
    pub fn presented(&self) -> usize {
        self.first_pixels.len()
    }
}

/// In-memory [`Host`]: a fixed viewport, a set of rectangles and a clock.
#[derive(Clone, Debug)]
pub struct HeadlessHost {
    clock: Clock,
    caps: Capabilities,
    focus: bool,
    viewport: Size,
    ratio: f64,
    elements: BTreeMap<ElementId, HeadlessElement>,
    next_element: u64,
    attach_order: Vec<ElementId>,
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    /// Host driven by the real monotonic clock.
    pub fn new() -> Self {
        Self::with_clock(Clock::Real(Instant::now()))
    }

    /// Host whose clock only moves through [`HeadlessHost::advance`].
    pub fn manual() -> Self {
        Self::with_clock(Clock::Manual(Duration::ZERO))
    }

    fn with_clock(clock: Clock) -> Self {
        Self {
            clock,
            caps: Capabilities::native(),
            focus: true,
            viewport: Size::new(1280.0, 720.0),
            ratio: 1.0,
            elements: BTreeMap::new(),
            next_element: 0,
            attach_order: Vec::new(),
        }
    }

    /// Move a manual clock forward. No effect on a real clock.
    pub fn advance(&mut self, by: Duration) {
        if let Clock::Manual(t) = &mut self.clock {
            *t += by;
        }
    }

    /// Add an element and return its id.
    pub fn add_element(&mut self, rect: Rect, source: Option<&str>) -> ElementId {
        self.next_element += 1;
        let id = ElementId(self.next_element);
        self.elements.insert(
            id,
            HeadlessElement {
                rect,
                source: source.map(str::to_owned),
                client_size: rect.size(),
                surface: None,
                last_frame: None,
                first_pixels: Vec::new(),
                placeholder: true,
            },
        );
        id
    }

    /// Inspect an element.
    pub fn element(&self, id: ElementId) -> Option<&HeadlessElement> {
        self.elements.get(&id)
    }

    /// Mutate an element, e.g. to move or resize it.
    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut HeadlessElement> {
        self.elements.get_mut(&id)
    }

    /// Set document focus.
    pub fn set_focus(&mut self, focus: bool) {
        self.focus = focus;
    }

    /// Set the viewport size.
    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = size;
    }

    /// Set the device pixel ratio.
    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        self.ratio = ratio;
    }

    /// Replace the reported capabilities. Only read when an orchestrator is created.
    pub fn set_capabilities(&mut self, caps: Capabilities) {
        self.caps = caps;
    }

    /// Elements in the order their surfaces were first attached.
    pub fn attach_order(&self) -> &[ElementId] {
        &self.attach_order
    }
}

impl Host for HeadlessHost {
    fn now(&self) -> Duration {
        match self.clock {
            Clock::Real(origin) => origin.elapsed(),
            Clock::Manual(t) => t,
        }
    }

    fn capabilities(&self) -> Capabilities {
        self.caps.clone()
    }

    fn document_has_focus(&self) -> bool {
        self.focus
    }

    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn bounding_rect(&self, element: ElementId) -> Option<Rect> {
        self.elements.get(&element).map(|e| e.rect)
    }

    fn client_size(&self, element: ElementId) -> Option<Size> {
        self.elements.get(&element).map(|e| e.client_size)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.ratio
    }

    fn animation_source(&self, element: ElementId) -> Option<String> {
        self.elements.get(&element).and_then(|e| e.source.clone())
    }

    fn attach_surface(&mut self, element: ElementId, size: PixelSize) {
        if let Some(e) = self.elements.get_mut(&element) {
            if e.surface.is_none() && !self.attach_order.contains(&element) {
                self.attach_order.push(element);
            }
            e.surface = Some(size);
        }
    }

    fn present(&mut self, element: ElementId, size: PixelSize, pixels: &[u8]) {
        let Some(e) = self.elements.get_mut(&element) else {
            return;
        };
        if e.surface != Some(size) {
            tracing::debug!(%element, %size, "present on mismatched surface");
        }
        let mut head = [0u8; 4];
        if let Some(src) = pixels.get(..4) {
            head.copy_from_slice(src);
        }
        e.first_pixels.push(head);
        e.last_frame = Some(pixels.to_vec());
    }

    fn remove_placeholder(&mut self, element: ElementId) {
        if let Some(e) = self.elements.get_mut(&element) {
            e.placeholder = false;
        }
    }

    fn detach_surface(&mut self, element: ElementId) {
        if let Some(e) = self.elements.get_mut(&element) {
            e.surface = None;
        }
    }
}
