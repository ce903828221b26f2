use std::fmt;
use std::time::Duration;

/// One decoded still image plus how long it stays on screen.
///
/// Pixels are RGBA8, `width * height * 4` bytes. The frame is owned by
/// exactly one [`FrameSequence`]; dropping the sequence releases it.
#[derive(Clone)]
pub struct Frame {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub delay: Duration,
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("delay", &self.delay)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// Ordered frames for one loaded animation, with loop count and the
/// logical canvas dimensions.
///
/// A sequence is produced wholesale by one decode (or one injection) and
/// destroyed wholesale on clear or replacement; it is never mutated in
/// place. `loop_count` of 0 means loop forever.
#[derive(Debug, Clone, Default)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    loop_count: u32,
    width: u32,
    height: u32,
}

impl FrameSequence {
    pub fn new(frames: Vec<Frame>, loop_count: u32, width: u32, height: u32) -> Self {
        Self {
            frames,
            loop_count,
            width,
            height,
        }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
