//! Delayed tooltip layer drawn above the top window.

use crate::component::{ComponentId, Tree};
use crate::constants::TOOLTIP_MAX_WIDTH;
use crate::geom::{Point, Rect, Size};
use crate::text::TextWrapper;
use crate::theme;
use crate::ui::UiFrame;

#[derive(Debug, Default, Clone)]
pub struct TooltipState {
    target: Option<ComponentId>,
    pointer: Option<Point>,
    since: u64,
}

impl TooltipState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Record where the pointer rests. Moving the pointer or changing the
    /// hovered target restarts the delay.
    pub fn track(&mut self, target: Option<ComponentId>, pointer: Option<Point>, now: u64) {
        if self.target != target || self.pointer != pointer {
            self.target = target;
            self.pointer = pointer;
            self.since = now;
        }
    }

    pub fn target(&self) -> Option<ComponentId> {
        self.target
    }

    /// The component and anchor point whose tooltip should show at `now`.
    pub fn ready(&self, now: u64, delay: u64) -> Option<(ComponentId, Point)> {
        let target = self.target?;
        let pointer = self.pointer?;
        (now.saturating_sub(self.since) >= delay).then_some((target, pointer))
    }
}

/// Deepest node on the hover chain of `root` that carries a tooltip.
pub fn hovered_tooltip(tree: &Tree, root: ComponentId) -> Option<ComponentId> {
    tree.hover_chain(root)
        .into_iter()
        .rev()
        .find(|id| tree.tooltip(*id).is_some())
}

/// Box for a tooltip of `content` size: just below and right of the
/// pointer, pushed back inside `bounds`.
pub fn tooltip_rect(content: Size, pointer: Point, bounds: Rect) -> Rect {
    let outer = Rect::new(pointer.x + 1, pointer.y + 1, content.width + 2, content.height + 2);
    bounds.clamp_rect(outer)
}

pub fn draw_tooltip(frame: &mut UiFrame<'_>, text: &str, pointer: Point, bounds: Rect) {
    let wrapped = TextWrapper::new(Some(TOOLTIP_MAX_WIDTH)).wrap(text);
    let content = Size::new(wrapped.width(), wrapped.height());
    let rect = tooltip_rect(content, pointer, bounds);
    if rect.is_empty() {
        return;
    }
    frame.fill_rect(rect, theme::tooltip());
    frame.outline_rect(rect, theme::tooltip_border());
    frame.with_clip(rect.inset(1), |frame| {
        wrapped.draw(frame, rect.pos + Point::new(1, 1), theme::tooltip())
    });
}
