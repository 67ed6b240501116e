use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
}

impl Pointer {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Floating HTML tooltip state; the host applies `left`/`top`/`opacity` to its element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub id: String,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Fade duration of show and hide.
    pub duration_ms: u64,
    pub left: f64,
    pub top: f64,
    pub opacity: f64,
    pub content: String,
    pub visible: bool,
}

impl Default for Tooltip {
    fn default() -> Self {
        Self::new("tooltip")
    }
}

impl Tooltip {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            offset_x: 30.0,
            offset_y: -40.0,
            duration_ms: 200,
            left: 0.0,
            top: 0.0,
            opacity: 0.0,
            content: String::new(),
            visible: false,
        }
    }

    pub fn show(&mut self, html: impl Into<String>, pointer: Pointer) {
        self.edit(html);
        self.move_to(pointer);
        self.visible = true;
        self.opacity = 1.0;
    }

    /// Fades out; the element stays displayed, only transparent.
    pub fn hide(&mut self) {
        self.opacity = 0.0;
    }

    /// Offsets the pointer position; a negative top snaps to 10.
    pub fn move_to(&mut self, pointer: Pointer) {
        self.left = pointer.x + self.offset_x;
        let top = pointer.y + self.offset_y;
        self.top = if top < 0.0 { 10.0 } else { top };
    }

    pub fn edit(&mut self, html: impl Into<String>) {
        self.content = html.into();
    }

    pub fn is_shown(&self) -> bool {
        self.visible && self.opacity > 0.0
    }
}
