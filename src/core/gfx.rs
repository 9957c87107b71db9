use glam::DVec2;

/// Axis-aligned rectangle with an explicit size. Resizing changes the
/// rectangle itself so outlines are never stretched.
#[derive(Clone, Debug, PartialEq)]
pub struct RectShape {
    pub size: DVec2,
    pub fill: [f32; 4],
    pub outline: [f32; 4],
    pub outline_thickness: f32,
}

impl RectShape {
    pub fn new(size: DVec2, fill: [f32; 4]) -> Self {
        Self {
            size,
            fill,
            outline: [0.0, 0.0, 0.0, 1.0],
            outline_thickness: 0.0,
        }
    }

    pub fn with_outline(mut self, outline: [f32; 4], thickness: f32) -> Self {
        self.outline = outline;
        self.outline_thickness = thickness;
        self
    }
}

/// Text is sized through a scale factor relative to its size at creation.
#[derive(Clone, Debug, PartialEq)]
pub struct TextShape {
    pub content: String,
    pub char_size: u32,
    pub fill: [f32; 4],
    pub scale: DVec2,
}

impl TextShape {
    pub fn new(content: impl Into<String>, char_size: u32, fill: [f32; 4]) -> Self {
        Self {
            content: content.into(),
            char_size,
            fill,
            scale: DVec2::ONE,
        }
    }

    /// Unscaled extent, assuming a monospace advance of 0.6 em.
    pub fn natural_size(&self) -> DVec2 {
        let em = f64::from(self.char_size);
        DVec2::new(self.content.chars().count() as f64 * em * 0.6, em)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Renderable {
    Rect(RectShape),
    Text(TextShape),
}

impl Renderable {
    #[inline(always)]
    pub const fn fill(&self) -> [f32; 4] {
        match self {
            Self::Rect(r) => r.fill,
            Self::Text(t) => t.fill,
        }
    }

    #[inline(always)]
    pub fn set_fill(&mut self, fill: [f32; 4]) {
        match self {
            Self::Rect(r) => r.fill = fill,
            Self::Text(t) => t.fill = fill,
        }
    }
}

/// Window/rendering backend.
pub trait Renderer {
    fn clear(&mut self, color: [f32; 4]);
    fn draw(&mut self, position: DVec2, renderable: &Renderable);
    fn present(&mut self);
}

/// Headless renderer that only counts what it was asked to do.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames: u64,
    pub draws_last_frame: usize,
    pub last_clear: [f32; 4],
    draws: usize,
}

impl Renderer for NullRenderer {
    fn clear(&mut self, color: [f32; 4]) {
        self.last_clear = color;
        self.draws = 0;
    }

    fn draw(&mut self, _position: DVec2, _renderable: &Renderable) {
        self.draws += 1;
    }

    fn present(&mut self) {
        self.frames += 1;
        self.draws_last_frame = self.draws;
        log::trace!("frame {} presented with {} draws", self.frames, self.draws);
    }
}
