//! Status panel: the icon display and the LED matrix.
//!
//! Drawing the bitmaps belongs to the display drivers. This type keeps
//! what should be shown, so redundant redraws are skipped and every
//! change is logged once.

use log::info;

use crate::fsm::context::{Glyph, Icon};

#[derive(Debug, Default)]
pub struct Panel {
    icon: Option<Icon>,
    glyph: Option<Glyph>,
    redraws: u32,
}

impl Panel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_icon(&mut self, icon: Icon) {
        if self.icon == Some(icon) {
            return;
        }
        info!("Panel: icon {:?}", icon);
        self.icon = Some(icon);
        self.redraws += 1;
    }

    pub fn show_glyph(&mut self, glyph: Glyph) {
        if self.glyph == Some(glyph) {
            return;
        }
        info!("Panel: matrix {:?}", glyph);
        self.glyph = Some(glyph);
        self.redraws += 1;
    }

    /// Blank the matrix. The next glyph is always drawn.
    pub fn clear_matrix(&mut self) {
        self.glyph = None;
    }

    pub fn icon(&self) -> Option<Icon> {
        self.icon
    }

    pub fn glyph(&self) -> Option<Glyph> {
        self.glyph
    }

    pub fn redraws(&self) -> u32 {
        self.redraws
    }
}
