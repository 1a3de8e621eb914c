use serde::{Deserialize, Serialize};

use crate::scene::{colors, OverlayRect};

pub const LOGO_TEXT: &str = "ROCKY ROAD";
pub const LOGO_SIZE: u32 = 256;

const BAR: u32 = 16;
const BAR_GROWTH: u32 = 4;
const BLINK_FRAMES: u32 = 120;
const FRAMES_PER_LETTER: u32 = 12;
const FADE_PER_FRAME: f32 = 0.02;

/// Animated logo reveal shown before the menu.
///
/// Phases: 0 blinking square, 1 top and left bars grow, 2 bottom and right
/// bars grow, 3 letters appear then everything fades, 4 done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntroSequence {
    phase: u8,
    frames_counter: u32,
    letters_count: usize,
    top_width: u32,
    left_height: u32,
    bottom_width: u32,
    right_height: u32,
    alpha: f32,
}

impl Default for IntroSequence {
    fn default() -> Self {
        Self {
            phase: 0,
            frames_counter: 0,
            letters_count: 0,
            top_width: BAR,
            left_height: BAR,
            bottom_width: BAR,
            right_height: BAR,
            alpha: 1.0,
        }
    }
}

impl IntroSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> u8 {
        self.phase
    }

    pub fn letters_count(&self) -> usize {
        self.letters_count
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_done(&self) -> bool {
        self.phase == 4
    }

    /// Advances one frame.
    pub fn step(&mut self) {
        match self.phase {
            0 => {
                self.frames_counter += 1;
                if self.frames_counter == BLINK_FRAMES {
                    self.phase = 1;
                    self.frames_counter = 0;
                }
            }
            1 => {
                self.top_width += BAR_GROWTH;
                self.left_height += BAR_GROWTH;
                if self.top_width == LOGO_SIZE {
                    self.phase = 2;
                }
            }
            2 => {
                self.bottom_width += BAR_GROWTH;
                self.right_height += BAR_GROWTH;
                if self.bottom_width == LOGO_SIZE {
                    self.phase = 3;
                }
            }
            3 => {
                self.frames_counter += 1;
                if self.frames_counter / FRAMES_PER_LETTER > 0 {
                    self.letters_count += 1;
                    self.frames_counter = 0;
                }
                if self.letters_count >= LOGO_TEXT.len() {
                    self.alpha -= FADE_PER_FRAME;
                    if self.alpha <= 0.0 {
                        self.alpha = 0.0;
                        self.phase = 4;
                    }
                }
            }
            _ => {}
        }
    }

    /// Letters of the logo revealed so far.
    pub fn visible_text(&self) -> &'static str {
        &LOGO_TEXT[..self.letters_count.min(LOGO_TEXT.len())]
    }

    /// Rectangles for the current phase, logo centred in `viewport`.
    pub fn overlay(&self, viewport: (u32, u32)) -> Vec<OverlayRect> {
        let (width, height) = (viewport.0 as f32, viewport.1 as f32);
        let half = LOGO_SIZE as f32 / 2.0;
        let (x, y) = (width / 2.0 - half, height / 2.0 - half);
        let bar = BAR as f32;
        let far = LOGO_SIZE as f32 - bar;
        let black = colors::fade(colors::BLACK, self.alpha);

        let mut rects = Vec::new();
        match self.phase {
            0 => {
                if (self.frames_counter / 15) % 2 == 1 {
                    rects.push(OverlayRect::new(x, y, bar, bar, black));
                }
            }
            1 => {
                rects.push(OverlayRect::new(x, y, self.top_width as f32, bar, black));
                rects.push(OverlayRect::new(x, y, bar, self.left_height as f32, black));
            }
            2 => {
                rects.push(OverlayRect::new(x, y, self.top_width as f32, bar, black));
                rects.push(OverlayRect::new(x, y, bar, self.left_height as f32, black));
                rects.push(OverlayRect::new(x + far, y, bar, self.right_height as f32, black));
                rects.push(OverlayRect::new(x, y + far, self.bottom_width as f32, bar, black));
            }
            3 => {
                let side = self.left_height as f32 - 2.0 * bar;
                rects.push(OverlayRect::new(x, y, self.top_width as f32, bar, black));
                rects.push(OverlayRect::new(x, y + bar, bar, side, black));
                rects.push(OverlayRect::new(x + far, y + bar, bar, side, black));
                rects.push(OverlayRect::new(x, y + far, self.bottom_width as f32, bar, black));
                let inner = LOGO_SIZE as f32 - 2.0 * bar;
                rects.push(OverlayRect::new(
                    x + bar,
                    y + bar,
                    inner,
                    inner,
                    colors::fade(colors::RAYWHITE, self.alpha),
                ));
                // One block per revealed letter; spaces leave a gap.
                for (i, letter) in self.visible_text().chars().enumerate() {
                    if letter == ' ' {
                        continue;
                    }
                    rects.push(OverlayRect::new(
                        width / 2.0 - 100.0 + i as f32 * 20.0,
                        height / 2.0 + 48.0,
                        16.0,
                        24.0,
                        black,
                    ));
                }
            }
            _ => {}
        }
        rects
    }
}
