//! Loading screen visibility.

use engine_core::Fade;

/// Seconds the loading screen takes to fade out.
pub const FADE_OUT_SECONDS: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LoadingScreen {
    #[default]
    Hidden,
    Visible,
    FadingOut(Fade),
}

impl LoadingScreen {
    pub fn show(&mut self) {
        *self = LoadingScreen::Visible;
    }

    /// Start fading out. Does nothing unless fully visible.
    pub fn dismiss(&mut self) {
        if *self == LoadingScreen::Visible {
            *self = LoadingScreen::FadingOut(Fade::new(1.0, 0.0, FADE_OUT_SECONDS));
        }
    }

    /// Advance the fade by the frame delta.
    pub fn advance(&mut self, dt: f32) {
        if let LoadingScreen::FadingOut(fade) = self {
            fade.advance(dt);
            if fade.is_finished() {
                *self = LoadingScreen::Hidden;
            }
        }
    }

    pub fn opacity(&self) -> f32 {
        match self {
            LoadingScreen::Hidden => 0.0,
            LoadingScreen::Visible => 1.0,
            LoadingScreen::FadingOut(fade) => fade.value(),
        }
    }

    pub fn is_visible(&self) -> bool {
        !matches!(self, LoadingScreen::Hidden)
    }
}
