use kurbo::{Rect, Size};

use crate::host::Host;
use crate::player::Player;

/// `false` only when `rect` lies entirely beyond one edge of a viewport of `viewport` size.
pub fn intersects_viewport(rect: Rect, viewport: Size) -> bool {
    !(rect.y1 < 0.0 || rect.x1 < 0.0 || rect.y0 > viewport.height || rect.x0 > viewport.width)
}

/// May `player` present a frame now? Refreshes the cached viewport visibility when it is
/// unknown or `recheck` is set.
pub(crate) fn permits<H: Host + ?Sized>(player: &mut Player, host: &H, recheck: bool) -> bool {
    let Some(pb) = player.playback.as_ref() else {
        return false;
    };
    if player.size.is_empty() {
        return false;
    }
    if player.options.force_render || pb.prime {
        return true;
    }
    if !host.document_has_focus() || player.paused || pb.frame_count == 0 {
        return false;
    }

    match player.in_viewport {
        Some(visible) if !recheck => visible,
        _ => {
            let visible = host
                .bounding_rect(player.element)
                .is_some_and(|r| intersects_viewport(r, host.viewport_size()));
            if player.in_viewport != Some(visible) {
                tracing::trace!(req_id = %player.req_id, visible, "viewport visibility changed");
            }
            player.in_viewport = Some(visible);
            visible
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/gate.rs"]
mod tests;
