use bytemuck::{Pod, Zeroable};

use crate::state::PipelineState;

/// Uniform values for every declaration the fragment shader may emit. Binders upload only the
/// ones the current shader declares.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FragmentUniforms {
    /// `u_alphacolorref`: color-test reference in `.rgb`, alpha reference in `.a`, on the 0..=255
    /// grid the shader quantizes to.
    pub alpha_color_ref: [f32; 4],
    /// `u_colormask`: 1.0 per channel whose mask byte is non-zero. Per-bit masks are approximated
    /// per channel, so `0x0F` acts like `0xFF`. `.a` carries the alpha-test mask the same way but
    /// is not read by the emitted alpha comparison.
    pub color_mask: [f32; 4],
    /// `u_texenv` in `.rgb`; `.a` is padding.
    pub tex_env: [f32; 4],
    /// `u_fogcolor` in `.rgb`; `.a` is padding.
    pub fog_color: [f32; 4],
}

impl FragmentUniforms {
    pub fn from_state(state: &PipelineState) -> Self {
        let [r, g, b] = bgr_bytes(state.color_test.reference);
        let [mr, mg, mb] = bgr_bytes(state.color_test.mask);
        let [er, eg, eb] = unorm_rgb(state.texture_env_color);
        let [fr, fg, fb] = unorm_rgb(state.fog_color);
        Self {
            alpha_color_ref: [
                f32::from(r),
                f32::from(g),
                f32::from(b),
                f32::from(state.alpha_test.reference),
            ],
            color_mask: [
                mask_channel(mr),
                mask_channel(mg),
                mask_channel(mb),
                mask_channel(state.alpha_test.mask),
            ],
            tex_env: [er, eg, eb, 0.0],
            fog_color: [fr, fg, fb, 0.0],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Splits a 0xBBGGRR register into `[r, g, b]`.
fn bgr_bytes(color: u32) -> [u8; 3] {
    let [r, g, b, _] = color.to_le_bytes();
    [r, g, b]
}

fn unorm_rgb(color: u32) -> [f32; 3] {
    bgr_bytes(color).map(|c| f32::from(c) / 255.0)
}

fn mask_channel(mask: u8) -> f32 {
    if mask != 0 {
        1.0
    } else {
        0.0
    }
}
