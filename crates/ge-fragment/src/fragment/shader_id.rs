use std::fmt;

use tracing::trace;

use super::classify::FragmentDecisions;
use crate::state::PipelineState;
use crate::stats::DrawCounter;

/// Bit offsets of the fragment shader ID fields, LSB first.
pub mod bits {
    pub const CLEAR_MODE: u32 = 0;
    pub const TEXTURE: u32 = 1;
    pub const TEXTURE_FUNCTION: u32 = 2;
    pub const TEXTURE_ALPHA: u32 = 5;
    pub const RESERVED: u32 = 6;
    pub const SECONDARY_COLOR: u32 = 7;
    pub const ALPHA_TEST_ENABLED: u32 = 8;
    pub const ALPHA_TEST_FUNC: u32 = 9;
    pub const COLOR_TEST_ENABLED: u32 = 12;
    pub const COLOR_TEST_FUNC: u32 = 13;
    pub const FOG: u32 = 15;
    pub const TEXTURE_PROJECTION: u32 = 16;
    pub const COLOR_DOUBLING: u32 = 17;
    pub const ALPHA_DOUBLING: u32 = 18;
    pub const ALPHA_TEST_LIVE: u32 = 19;
    pub const COLOR_TEST_LIVE: u32 = 20;
    /// Total number of bits in use.
    pub const WIDTH: u32 = 21;
}

/// Packed description of everything that changes the generated fragment shader.
///
/// Equal IDs always correspond to byte-identical shader text for a given
/// [`crate::caps::EmitPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FragmentShaderId(pub u32);

impl FragmentShaderId {
    /// Every clear-mode state renders with the same shader.
    pub const CLEAR: FragmentShaderId = FragmentShaderId(1 << bits::CLEAR_MODE);

    pub fn is_clear(self) -> bool {
        self == Self::CLEAR
    }

    /// Extracts `width` bits starting at `offset`. Bits past the top of the ID read as zero.
    pub fn field(self, offset: u32, width: u32) -> u32 {
        let value = self.0.checked_shr(offset).unwrap_or(0);
        let mask = 1u32.checked_shl(width).map_or(u32::MAX, |bit| bit - 1);
        value & mask
    }

    pub fn flag(self, offset: u32) -> bool {
        self.field(offset, 1) != 0
    }
}

impl fmt::Display for FragmentShaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// Appends fields to a [`FragmentShaderId`] in order, each with an explicit width.
///
/// The write order *is* the layout; [`bits`] mirrors it for readers and tests.
#[derive(Debug, Default)]
pub struct IdFieldWriter {
    value: u32,
    offset: u32,
}

impl IdFieldWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&mut self, value: u32, width: u32) -> &mut Self {
        debug_assert!(width > 0 && width < 32);
        debug_assert!(
            value < (1 << width),
            "value {value} does not fit in {width} bits"
        );
        debug_assert!(self.offset + width <= 32, "fragment shader ID overflow");
        self.value |= value << self.offset;
        self.offset += width;
        self
    }

    pub fn flag(&mut self, value: bool) -> &mut Self {
        self.field(value as u32, 1)
    }

    /// Skips `width` zero bits.
    pub fn reserved(&mut self, width: u32) -> &mut Self {
        self.field(0, width)
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn finish(&self) -> FragmentShaderId {
        FragmentShaderId(self.value)
    }
}

/// Packs `decisions` into an ID. Pure; see [`compute_fragment_shader_id`] for the counted entry
/// point.
pub fn encode_decisions(decisions: &FragmentDecisions) -> FragmentShaderId {
    if decisions.clear_mode {
        return FragmentShaderId::CLEAR;
    }

    let texture = decisions.texture;
    let mut w = IdFieldWriter::new();
    w.flag(false) // clear mode
        .flag(texture.is_some())
        .field(texture.map_or(0, |t| t.function as u32), 3)
        .flag(texture.is_some_and(|t| t.rgba))
        .reserved(1)
        .flag(decisions.secondary_color)
        .flag(decisions.alpha_test_enabled)
        .field(decisions.alpha_test.map_or(0, |f| f as u32), 3)
        .flag(decisions.color_test_enabled)
        .field(decisions.color_test.map_or(0, |f| f as u32), 2)
        .flag(decisions.fog)
        .flag(texture.is_some_and(|t| t.projected))
        .flag(decisions.color_doubling)
        .flag(decisions.alpha_doubling)
        .flag(decisions.alpha_test.is_some())
        .flag(decisions.color_test.is_some());
    debug_assert_eq!(w.offset(), bits::WIDTH);
    w.finish()
}

/// Computes the cache key for the fragment shader `state` needs and records the draw with
/// `counter`. Clear-mode draws are not counted.
pub fn compute_fragment_shader_id<C: DrawCounter + ?Sized>(
    state: &PipelineState,
    counter: &C,
) -> FragmentShaderId {
    let decisions = FragmentDecisions::from_state(state);
    let id = encode_decisions(&decisions);
    if !decisions.clear_mode {
        counter.record_draw(decisions.alpha_test.is_some());
    }
    trace!(%id, "computed fragment shader id");
    id
}
