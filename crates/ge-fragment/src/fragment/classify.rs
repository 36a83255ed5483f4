//! Dead-code detection over [`PipelineState`].
//!
//! Both the ID encoder and the shader emitter go through [`FragmentDecisions::from_state`]; the
//! cache key and the generated program can only agree if they see the same decisions.

use crate::state::{
    BlendDstFactor, BlendSrcFactor, ColorTestFunc, CompareFunc, PipelineState, TextureFunction,
    UvGenMode,
};

/// Destination factors for which a `GREATER 0` / `NOTEQUAL 0` alpha test can be dropped when the
/// source factor is `SRCALPHA`: a fragment with alpha 0 contributes nothing through the source
/// term, and these factors don't scale the destination by source alpha.
fn is_safe_dst_factor(dst: BlendDstFactor) -> bool {
    !matches!(
        dst,
        BlendDstFactor::SrcAlpha
            | BlendDstFactor::DoubleSrcAlpha
            | BlendDstFactor::DoubleInvSrcAlpha
    )
}

/// True when the alpha test can never change the rendered result.
pub fn is_alpha_test_trivially_true(state: &PipelineState) -> bool {
    let test = &state.alpha_test;
    match test.func {
        CompareFunc::Never => false,
        CompareFunc::Always => true,
        CompareFunc::GreaterEqual => test.reference == 0,
        CompareFunc::LessEqual => test.reference == 255,
        CompareFunc::Equal | CompareFunc::Less => false,
        // Only alpha == 0 fails here. With no depth/stencil side effects and SRCALPHA blending,
        // such a fragment leaves the framebuffer untouched anyway.
        CompareFunc::NotEqual | CompareFunc::Greater => {
            !state.stencil_test_enabled
                && !state.depth_test_enabled
                && test.reference == 0
                && state.blend.enabled
                && state.blend.src == BlendSrcFactor::SrcAlpha
                && is_safe_dst_factor(state.blend.dst)
        }
    }
}

/// True when the color test can never change the rendered result.
pub fn is_color_test_trivially_true(state: &PipelineState) -> bool {
    match state.color_test.func {
        ColorTestFunc::Never => false,
        ColorTestFunc::Always => true,
        ColorTestFunc::Equal | ColorTestFunc::NotEqual => false,
    }
}

/// True when exactly one blend factor is `DOUBLESRCALPHA` and the other can tolerate the source
/// alpha being doubled in the shader instead.
///
/// `SRCALPHA` / `INVSRCALPHA` on the other side would read the doubled alpha (e.g.
/// `2*src, 1-src`), so those pairs are rejected.
pub fn can_double_src_blend_mode(state: &PipelineState) -> bool {
    let blend = &state.blend;
    if !blend.enabled {
        return false;
    }

    let src_doubled = blend.src == BlendSrcFactor::DoubleSrcAlpha;
    let dst_doubled = blend.dst == BlendDstFactor::DoubleSrcAlpha;
    match (src_doubled, dst_doubled) {
        (true, false) => !matches!(
            blend.dst,
            BlendDstFactor::SrcAlpha | BlendDstFactor::InvSrcAlpha
        ),
        (false, true) => !matches!(
            blend.src,
            BlendSrcFactor::SrcAlpha | BlendSrcFactor::InvSrcAlpha
        ),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureDecisions {
    pub function: TextureFunction,
    /// Combine as RGBA (texture alpha participates) rather than RGB.
    pub rgba: bool,
    /// Sample with `texture2DProj` from a 3-component coordinate.
    pub projected: bool,
}

/// Everything shader generation branches on, derived from a [`PipelineState`].
///
/// In clear mode every field other than `clear_mode` is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FragmentDecisions {
    pub clear_mode: bool,
    pub texture: Option<TextureDecisions>,
    /// Lit with a separate specular color added after texturing.
    pub secondary_color: bool,
    /// Raw alpha-test enable flag.
    pub alpha_test_enabled: bool,
    /// Alpha test that survived simplification.
    pub alpha_test: Option<CompareFunc>,
    /// Raw color-test enable flag.
    pub color_test_enabled: bool,
    /// Color test that survived simplification.
    pub color_test: Option<ColorTestFunc>,
    pub fog: bool,
    pub color_doubling: bool,
    pub alpha_doubling: bool,
}

impl FragmentDecisions {
    pub fn from_state(state: &PipelineState) -> Self {
        if state.clear_mode {
            return Self {
                clear_mode: true,
                ..Self::default()
            };
        }

        let texture = state.texture_enabled.then(|| {
            let function = state.texture_function;
            // With full alpha, every function except REPLACE produces the same result for RGB and
            // RGBA. Reserved functions ignore the texel entirely.
            let rgba = state.texture_alpha_used
                && !(state.texture_full_alpha && function != TextureFunction::Replace)
                && !function.is_reserved();
            TextureDecisions {
                function,
                rgba,
                projected: state.uv_gen_mode == UvGenMode::TextureMatrix,
            }
        });

        let alpha_test = (state.alpha_test.enabled && !is_alpha_test_trivially_true(state))
            .then_some(state.alpha_test.func);
        let color_test = (state.color_test.enabled && !is_color_test_trivially_true(state))
            .then_some(state.color_test.func);

        Self {
            clear_mode: false,
            texture,
            secondary_color: state.lighting_enabled && state.secondary_color,
            alpha_test_enabled: state.alpha_test.enabled,
            alpha_test,
            color_test_enabled: state.color_test.enabled,
            color_test,
            fog: state.fog_enabled && !state.through_mode,
            color_doubling: state.color_doubling,
            alpha_doubling: can_double_src_blend_mode(state),
        }
    }
}
