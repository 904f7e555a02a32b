//! Report colors, as 0xRRGGBB

use crate::models::MovementKind;

/// Title bands, header rows and footer label text
pub const SLATE: u32 = 0x374151;
pub const WHITE: u32 = 0xFFFFFF;
pub const WHITESMOKE: u32 = 0xF5F5F5;
pub const GRID_GREY: u32 = 0x808080;
pub const RED: u32 = 0xE11D48;
pub const GREEN: u32 = 0x15803D;
pub const BLUE: u32 = 0x1D4ED8;

/// Amount color of a known movement type
pub fn kind_color(kind: &MovementKind) -> Option<u32> {
    match kind {
        MovementKind::Income => Some(GREEN),
        MovementKind::Expense => Some(RED),
        MovementKind::Saving => Some(BLUE),
        MovementKind::Other(_) => None,
    }
}

/// Green for a non-negative balance, red otherwise
pub fn balance_color(non_negative: bool) -> u32 {
    if non_negative { GREEN } else { RED }
}

/// Split into 0.0..=1.0 channels
pub fn rgb_channels(color: u32) -> (f32, f32, f32) {
    let channel = |shift: u32| ((color >> shift) & 0xFF) as f32 / 255.0;
    (channel(16), channel(8), channel(0))
}
