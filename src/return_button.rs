// return_button.rs — auto-return toggle on the control bar
//
// Only the visible state lives here; the flag itself belongs to the
// controller and the shell keeps the two in sync.

use crate::i18n;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnButtonStyle {
    /// Auto-return is running; clicking turns it off.
    Off,
    On,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnButton {
    auto_return: bool,
}

impl ReturnButton {
    pub fn new(auto_return: bool) -> Self {
        Self { auto_return }
    }

    pub fn update(&mut self, auto_return: bool) {
        self.auto_return = auto_return;
    }

    /// Flag value a click requests.
    pub fn toggled(&self) -> bool {
        !self.auto_return
    }

    pub fn style(&self) -> ReturnButtonStyle {
        if self.auto_return {
            ReturnButtonStyle::Off
        } else {
            ReturnButtonStyle::On
        }
    }

    /// Tooltip describing what a click does.
    pub fn title(&self) -> String {
        match self.style() {
            ReturnButtonStyle::Off => i18n::tr("return_button.turn_off"),
            ReturnButtonStyle::On => i18n::tr("return_button.turn_on"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_tracks_flag() {
        let mut b = ReturnButton::new(true);
        assert_eq!(b.style(), ReturnButtonStyle::Off);
        assert_eq!(b.title(), "Auto-Return Off");
        assert!(!b.toggled());

        b.update(false);
        assert_eq!(b.style(), ReturnButtonStyle::On);
        assert_eq!(b.title(), "Auto-Return On");
        assert!(b.toggled());
    }
}
