use crate::component::{Component, ComponentId, Ctx, Tree};
use crate::geom::{Point, Rect};
use crate::theme;
use crate::ui::UiFrame;

/// Bordered container. Children are clipped to the area inside the border
/// and the border is drawn over them.
#[derive(Debug, Default)]
pub struct Panel {
    title: Option<String>,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
        }
    }

    /// Create the panel node at `rect` with its child clip set to the inner
    /// area.
    pub fn create(tree: &mut Tree, panel: Panel, rect: Rect) -> ComponentId {
        let id = tree.create(panel);
        tree.set_rect(id, rect);
        tree.set_child_clip(id, Some(Self::inner(rect.size.width, rect.size.height)));
        id
    }

    /// Inner area, relative to the panel.
    pub fn inner(width: i32, height: i32) -> Rect {
        Rect::new(1, 1, (width - 2).max(0), (height - 2).max(0))
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }
}

impl Component for Panel {
    fn draw(&mut self, ctx: &mut Ctx<'_>, frame: &mut UiFrame<'_>) {
        frame.fill_rect(ctx.rect(), theme::panel_bg());
    }

    fn draw_after_children(&mut self, ctx: &mut Ctx<'_>, frame: &mut UiFrame<'_>) {
        let rect = ctx.rect();
        let border = if ctx.focused() && ctx.focused_child(ctx.id()).is_some() {
            theme::panel_border_focused()
        } else {
            theme::panel_border()
        };
        frame.outline_rect(rect, border);
        if let Some(title) = &self.title
            && rect.size.width > 4
        {
            let max = (rect.size.width - 4) as usize;
            let title: String = title.chars().take(max).collect();
            frame.with_clip(rect, |frame| {
                frame.text_run(rect.pos + Point::new(2, 0), &title, border)
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::buffer::Buffer;
    use ratatui::layout::Rect as CellRect;

    #[test]
    fn children_are_clipped_inside_the_border() {
        let mut tree = Tree::new();
        let panel = Panel::create(&mut tree, Panel::titled("T"), Rect::new(0, 0, 6, 4));
        let child = tree.create(crate::components::Label::new("abcdefgh"));
        tree.set_rect(child, Rect::new(1, 1, 10, 1));
        tree.insert_child(panel, child).unwrap();

        let area = CellRect::new(0, 0, 6, 4);
        let mut buffer = Buffer::empty(area);
        let mut frame = UiFrame::from_parts(area, &mut buffer);
        tree.draw(panel, &mut frame);

        let row: String = (0..6).map(|x| buffer[(x, 1)].symbol().to_string()).collect();
        assert_eq!(row, "│abcd│");
        let top: String = (0..6).map(|x| buffer[(x, 0)].symbol().to_string()).collect();
        assert_eq!(top, "┌─T──┐");
    }
}
