use ratatui::style::Style;

use crate::component::{Component, Ctx};
use crate::text::{TextWrapper, WrappedText};
use crate::ui::UiFrame;

/// Static, optionally formatted text wrapped to the node's width.
#[derive(Debug)]
pub struct Label {
    text: String,
    style: Style,
    wrapper: TextWrapper,
    layout: Option<WrappedText>,
}

impl Label {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: Style::default(),
            wrapper: TextWrapper::new(None),
            layout: None,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.layout = None;
    }

    /// Layout for a box `width` cells wide, rebuilt when the width or the
    /// text changed.
    pub fn layout(&mut self, width: i32) -> &WrappedText {
        if self.wrapper.max_width() != Some(width) {
            self.wrapper.set_max_width(Some(width));
            self.layout = None;
        }
        self.layout.get_or_insert_with(|| self.wrapper.wrap(&self.text))
    }
}

impl Component for Label {
    fn draw(&mut self, ctx: &mut Ctx<'_>, frame: &mut UiFrame<'_>) {
        let rect = ctx.rect();
        let style = self.style;
        frame.with_clip(rect, |frame| self.layout(rect.size.width).draw(frame, rect.pos, style));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relayouts_on_width_change() {
        let mut label = Label::new("one two");
        assert_eq!(label.layout(3).line_count(), 2);
        assert_eq!(label.layout(20).line_count(), 1);
        label.set_text("x");
        assert_eq!(label.layout(20).text(), "x");
    }
}
