//! `ge-fragment` compiles the fixed-function fragment state of a GE-style graphics unit into
//! GLSL fragment shaders.
//!
//! Currently this crate provides:
//! - A typed snapshot of the fragment-relevant state (see [`PipelineState`]).
//! - A compact, canonical cache key for the shader a state needs (see [`FragmentShaderId`]).
//! - GLSL ES 1.00 / GLSL 1.10 generation that omits every provably dead stage
//!   (see [`generate_fragment_shader`]), plus a keyed source cache.
//! - Draw-count telemetry through an injected [`DrawCounter`].

pub mod caps;
pub mod fragment;
pub mod state;
pub mod stats;

pub use caps::{Dialect, EmitPolicy, GpuVendor, ShaderQuirks};
pub use fragment::classify::FragmentDecisions;
pub use fragment::shader_gen::{
    emit_fragment_shader, fragment_shader_len, generate_fragment_shader,
    generate_fragment_shader_into, write_fragment_shader_nul, EmitError, MAX_FRAGMENT_SHADER_LEN,
};
pub use fragment::shader_id::{compute_fragment_shader_id, FragmentShaderId};
pub use fragment::uniforms::FragmentUniforms;
pub use fragment::{FragmentShaderCache, GeneratedFragmentShader};
pub use state::{
    AlphaTestState, BlendDstFactor, BlendSrcFactor, BlendState, ColorTestFunc, ColorTestState,
    CompareFunc, PipelineState, StateError, TextureFunction, UvGenMode,
};
pub use stats::{DrawCounter, DrawStats, DrawStatsSnapshot, NoopDrawCounter};
