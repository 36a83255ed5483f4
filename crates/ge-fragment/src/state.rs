//! Typed snapshot of the fixed-function fragment state.
//!
//! The raw values live in GE command registers owned by the caller. This module only models the
//! fields that influence fragment shading; decoding from register words goes through the
//! `from_raw` constructors, which reject values outside each field's bit width.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("{field} value {value} is out of range (max {max})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        max: u32,
    },
}

fn out_of_range(field: &'static str, value: u32, max: u32) -> StateError {
    StateError::OutOfRange { field, value, max }
}

/// Comparison used by the alpha test (3-bit field).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunc {
    Never = 0,
    #[default]
    Always = 1,
    Equal = 2,
    NotEqual = 3,
    Less = 4,
    LessEqual = 5,
    Greater = 6,
    GreaterEqual = 7,
}

impl CompareFunc {
    pub fn from_raw(value: u32) -> Result<Self, StateError> {
        Ok(match value {
            0 => Self::Never,
            1 => Self::Always,
            2 => Self::Equal,
            3 => Self::NotEqual,
            4 => Self::Less,
            5 => Self::LessEqual,
            6 => Self::Greater,
            7 => Self::GreaterEqual,
            _ => return Err(out_of_range("alpha test func", value, 7)),
        })
    }

    pub const ALL: [CompareFunc; 8] = [
        Self::Never,
        Self::Always,
        Self::Equal,
        Self::NotEqual,
        Self::Less,
        Self::LessEqual,
        Self::Greater,
        Self::GreaterEqual,
    ];

    /// Evaluates `lhs <func> rhs` the way the fixed-function unit does.
    pub fn passes(self, lhs: u8, rhs: u8) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::Equal => lhs == rhs,
            Self::NotEqual => lhs != rhs,
            Self::Less => lhs < rhs,
            Self::LessEqual => lhs <= rhs,
            Self::Greater => lhs > rhs,
            Self::GreaterEqual => lhs >= rhs,
        }
    }
}

/// Comparison used by the color test (2-bit field).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorTestFunc {
    Never = 0,
    #[default]
    Always = 1,
    Equal = 2,
    NotEqual = 3,
}

impl ColorTestFunc {
    pub fn from_raw(value: u32) -> Result<Self, StateError> {
        Ok(match value {
            0 => Self::Never,
            1 => Self::Always,
            2 => Self::Equal,
            3 => Self::NotEqual,
            _ => return Err(out_of_range("color test func", value, 3)),
        })
    }

    pub const ALL: [ColorTestFunc; 4] = [Self::Never, Self::Always, Self::Equal, Self::NotEqual];
}

/// Source blend factor (4-bit field, 0..=10 defined).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendSrcFactor {
    DstColor = 0,
    InvDstColor = 1,
    #[default]
    SrcAlpha = 2,
    InvSrcAlpha = 3,
    DstAlpha = 4,
    InvDstAlpha = 5,
    DoubleSrcAlpha = 6,
    DoubleInvSrcAlpha = 7,
    DoubleDstAlpha = 8,
    DoubleInvDstAlpha = 9,
    Fixed = 10,
}

impl BlendSrcFactor {
    pub fn from_raw(value: u32) -> Result<Self, StateError> {
        Ok(match value {
            0 => Self::DstColor,
            1 => Self::InvDstColor,
            2 => Self::SrcAlpha,
            3 => Self::InvSrcAlpha,
            4 => Self::DstAlpha,
            5 => Self::InvDstAlpha,
            6 => Self::DoubleSrcAlpha,
            7 => Self::DoubleInvSrcAlpha,
            8 => Self::DoubleDstAlpha,
            9 => Self::DoubleInvDstAlpha,
            10 => Self::Fixed,
            _ => return Err(out_of_range("blend src factor", value, 10)),
        })
    }

    pub const ALL: [BlendSrcFactor; 11] = [
        Self::DstColor,
        Self::InvDstColor,
        Self::SrcAlpha,
        Self::InvSrcAlpha,
        Self::DstAlpha,
        Self::InvDstAlpha,
        Self::DoubleSrcAlpha,
        Self::DoubleInvSrcAlpha,
        Self::DoubleDstAlpha,
        Self::DoubleInvDstAlpha,
        Self::Fixed,
    ];
}

/// Destination blend factor (4-bit field, 0..=10 defined).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlendDstFactor {
    SrcColor = 0,
    InvSrcColor = 1,
    SrcAlpha = 2,
    #[default]
    InvSrcAlpha = 3,
    DstAlpha = 4,
    InvDstAlpha = 5,
    DoubleSrcAlpha = 6,
    DoubleInvSrcAlpha = 7,
    DoubleDstAlpha = 8,
    DoubleInvDstAlpha = 9,
    Fixed = 10,
}

impl BlendDstFactor {
    pub fn from_raw(value: u32) -> Result<Self, StateError> {
        Ok(match value {
            0 => Self::SrcColor,
            1 => Self::InvSrcColor,
            2 => Self::SrcAlpha,
            3 => Self::InvSrcAlpha,
            4 => Self::DstAlpha,
            5 => Self::InvDstAlpha,
            6 => Self::DoubleSrcAlpha,
            7 => Self::DoubleInvSrcAlpha,
            8 => Self::DoubleDstAlpha,
            9 => Self::DoubleInvDstAlpha,
            10 => Self::Fixed,
            _ => return Err(out_of_range("blend dst factor", value, 10)),
        })
    }

    pub const ALL: [BlendDstFactor; 11] = [
        Self::SrcColor,
        Self::InvSrcColor,
        Self::SrcAlpha,
        Self::InvSrcAlpha,
        Self::DstAlpha,
        Self::InvDstAlpha,
        Self::DoubleSrcAlpha,
        Self::DoubleInvSrcAlpha,
        Self::DoubleDstAlpha,
        Self::DoubleInvDstAlpha,
        Self::Fixed,
    ];
}

/// Texture combine function (3-bit field). Values 5..=7 are undefined on hardware and pass the
/// primary color through.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureFunction {
    #[default]
    Modulate = 0,
    Decal = 1,
    Blend = 2,
    Replace = 3,
    Add = 4,
    Reserved5 = 5,
    Reserved6 = 6,
    Reserved7 = 7,
}

impl TextureFunction {
    pub fn from_raw(value: u32) -> Result<Self, StateError> {
        Ok(match value {
            0 => Self::Modulate,
            1 => Self::Decal,
            2 => Self::Blend,
            3 => Self::Replace,
            4 => Self::Add,
            5 => Self::Reserved5,
            6 => Self::Reserved6,
            7 => Self::Reserved7,
            _ => return Err(out_of_range("texture function", value, 7)),
        })
    }

    pub const ALL: [TextureFunction; 8] = [
        Self::Modulate,
        Self::Decal,
        Self::Blend,
        Self::Replace,
        Self::Add,
        Self::Reserved5,
        Self::Reserved6,
        Self::Reserved7,
    ];

    pub fn is_reserved(self) -> bool {
        matches!(self, Self::Reserved5 | Self::Reserved6 | Self::Reserved7)
    }
}

impl fmt::Display for TextureFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TextureFunction::Modulate => "modulate",
            TextureFunction::Decal => "decal",
            TextureFunction::Blend => "blend",
            TextureFunction::Replace => "replace",
            TextureFunction::Add => "add",
            TextureFunction::Reserved5 => "reserved5",
            TextureFunction::Reserved6 => "reserved6",
            TextureFunction::Reserved7 => "reserved7",
        };
        f.write_str(s)
    }
}

/// UV generation mode (2-bit field). Only `TextureMatrix` changes fragment shading: it produces
/// homogeneous coordinates that must be sampled projectively.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UvGenMode {
    #[default]
    TexCoords = 0,
    TextureMatrix = 1,
    EnvironmentMap = 2,
    Unknown = 3,
}

impl UvGenMode {
    pub fn from_raw(value: u32) -> Result<Self, StateError> {
        Ok(match value {
            0 => Self::TexCoords,
            1 => Self::TextureMatrix,
            2 => Self::EnvironmentMap,
            3 => Self::Unknown,
            _ => return Err(out_of_range("uv gen mode", value, 3)),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AlphaTestState {
    pub enabled: bool,
    pub func: CompareFunc,
    pub reference: u8,
    pub mask: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorTestState {
    pub enabled: bool,
    pub func: ColorTestFunc,
    /// 0xBBGGRR.
    pub reference: u32,
    /// 0xBBGGRR.
    pub mask: u32,
}

impl Default for ColorTestState {
    fn default() -> Self {
        Self {
            enabled: false,
            func: ColorTestFunc::Always,
            reference: 0,
            mask: 0x00FF_FFFF,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BlendState {
    pub enabled: bool,
    pub src: BlendSrcFactor,
    pub dst: BlendDstFactor,
}

/// Everything the fragment stage of the fixed-function pipeline depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PipelineState {
    pub clear_mode: bool,
    /// Pre-transformed vertices. Fog is never applied in this mode.
    pub through_mode: bool,

    pub texture_enabled: bool,
    pub texture_function: TextureFunction,
    /// The texture function consumes texture alpha (RGBA) instead of forcing it to 1 (RGB).
    pub texture_alpha_used: bool,
    /// The bound texture's format has no alpha bits, so every texel has alpha 1.
    pub texture_full_alpha: bool,
    pub uv_gen_mode: UvGenMode,
    /// 0xBBGGRR.
    pub texture_env_color: u32,

    pub lighting_enabled: bool,
    /// Lighting outputs specular separately (added after texturing).
    pub secondary_color: bool,

    pub fog_enabled: bool,
    /// 0xBBGGRR.
    pub fog_color: u32,

    pub color_doubling: bool,

    pub alpha_test: AlphaTestState,
    pub color_test: ColorTestState,
    pub blend: BlendState,
    pub depth_test_enabled: bool,
    pub stencil_test_enabled: bool,
}
