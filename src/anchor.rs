//! Bit-flag vocabulary for anchoring a text string to a point.
//!
//! Horizontal and vertical flags combine with `|`, e.g.
//! `TextAnchor::CENTER_X | TextAnchor::TOP`. When no horizontal flag is
//! set, backends treat the text as left-anchored; when no vertical flag
//! is set, as baseline/bottom-anchored.

use std::ops::{BitOr, BitOrAssign};

/// Anchor flags for drawn text.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextAnchor {
    bits: u8,
}

impl TextAnchor {
    pub const LEFT: TextAnchor = TextAnchor { bits: 0x01 };
    pub const CENTER_X: TextAnchor = TextAnchor { bits: 0x02 };
    pub const RIGHT: TextAnchor = TextAnchor { bits: 0x04 };
    pub const BOTTOM: TextAnchor = TextAnchor { bits: 0x08 };
    pub const CENTER_Y: TextAnchor = TextAnchor { bits: 0x10 };
    pub const TOP: TextAnchor = TextAnchor { bits: 0x20 };

    pub fn is_left(self) -> bool {
        self.bits & Self::LEFT.bits != 0
    }

    pub fn is_center_x(self) -> bool {
        self.bits & Self::CENTER_X.bits != 0
    }

    pub fn is_right(self) -> bool {
        self.bits & Self::RIGHT.bits != 0
    }

    pub fn is_bottom(self) -> bool {
        self.bits & Self::BOTTOM.bits != 0
    }

    pub fn is_center_y(self) -> bool {
        self.bits & Self::CENTER_Y.bits != 0
    }

    pub fn is_top(self) -> bool {
        self.bits & Self::TOP.bits != 0
    }
}

impl BitOr for TextAnchor {
    type Output = TextAnchor;
    fn bitor(self, rhs: TextAnchor) -> TextAnchor {
        TextAnchor { bits: self.bits | rhs.bits }
    }
}

impl BitOrAssign for TextAnchor {
    fn bitor_assign(&mut self, rhs: TextAnchor) {
        self.bits |= rhs.bits;
    }
}
