//! Target selection for shader emission.
//!
//! The dialect and GPU vendor are process-wide facts about the host driver. They are folded into
//! an [`EmitPolicy`] once at startup and passed explicitly into every emission call, so emission
//! stays a pure function of `(state, policy)`.

use bitflags::bitflags;
use tracing::debug;

/// Shading-language dialect of the host driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// GLSL ES 1.00 (OpenGL ES 2.0 / WebGL 1).
    GlslEs100,
    /// GLSL 1.10 (desktop OpenGL 2.0+).
    #[default]
    Glsl110,
}

impl Dialect {
    pub fn is_embedded(self) -> bool {
        matches!(self, Dialect::GlslEs100)
    }

    pub fn version_directive(self) -> &'static str {
        match self {
            Dialect::GlslEs100 => "#version 100\n",
            Dialect::Glsl110 => "#version 110\n",
        }
    }

    /// Default float precision statement. Required by GLSL ES fragment shaders, rejected by
    /// GLSL 1.10.
    pub fn precision_directive(self) -> Option<&'static str> {
        match self {
            Dialect::GlslEs100 => Some("precision lowp float;\n"),
            Dialect::Glsl110 => None,
        }
    }

    /// `mediump ` in the embedded dialect, nothing on desktop.
    pub(crate) fn mediump(self) -> &'static str {
        if self.is_embedded() {
            "mediump "
        } else {
            ""
        }
    }
}

/// GPU vendor of the host driver, as reported by `GL_VENDOR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GpuVendor {
    #[default]
    Unknown,
    PowerVr,
    Mali,
    Adreno,
    Nvidia,
    Amd,
    Intel,
    Broadcom,
    Vivante,
}

impl GpuVendor {
    pub fn from_gl_vendor(vendor: &str) -> Self {
        let vendor = vendor.trim();
        let v = if vendor.starts_with("Imagination Technologies") {
            GpuVendor::PowerVr
        } else if vendor == "ARM" || vendor.starts_with("ARM ") {
            GpuVendor::Mali
        } else if vendor.starts_with("Qualcomm") {
            GpuVendor::Adreno
        } else if vendor.starts_with("NVIDIA") {
            GpuVendor::Nvidia
        } else if vendor.starts_with("Advanced Micro Devices") || vendor.starts_with("ATI ") {
            GpuVendor::Amd
        } else if vendor.starts_with("Intel") {
            GpuVendor::Intel
        } else if vendor.starts_with("Broadcom") {
            GpuVendor::Broadcom
        } else if vendor.starts_with("Vivante") {
            GpuVendor::Vivante
        } else {
            GpuVendor::Unknown
        };
        if v == GpuVendor::Unknown {
            debug!(vendor, "unrecognised GL_VENDOR string");
        }
        v
    }
}

bitflags! {
    /// Driver workarounds applied during emission.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ShaderQuirks: u32 {
        /// Quantize to the 8-bit grid with an additive bias and `fract` instead of
        /// `floor(x * 255.0 + 0.5)`; some drivers lose precision in the latter.
        const BIASED_ROUNDING = 1 << 0;
        /// Discarding on equality misbehaves after quantization; the NOTEQUAL alpha comparison
        /// (which discards when alpha equals the reference) is skipped.
        const NO_EQUALITY_DISCARD = 1 << 1;
    }
}

impl ShaderQuirks {
    pub fn for_vendor(vendor: GpuVendor) -> Self {
        match vendor {
            GpuVendor::PowerVr => ShaderQuirks::BIASED_ROUNDING | ShaderQuirks::NO_EQUALITY_DISCARD,
            _ => ShaderQuirks::empty(),
        }
    }
}

/// Everything about the host target that changes emitted text.
///
/// None of these fields feed into the fragment shader ID; a process uses a single policy, and
/// [`crate::fragment::FragmentShaderCache`] clears itself when the policy is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EmitPolicy {
    pub dialect: Dialect,
    pub quirks: ShaderQuirks,
    /// Replace the output with a texture/magenta visualization.
    pub debug_overlay: bool,
}

impl EmitPolicy {
    pub fn for_target(dialect: Dialect, vendor: GpuVendor) -> Self {
        Self {
            dialect,
            quirks: ShaderQuirks::for_vendor(vendor),
            debug_overlay: false,
        }
    }

    pub fn desktop() -> Self {
        Self::for_target(Dialect::Glsl110, GpuVendor::Unknown)
    }

    pub fn embedded() -> Self {
        Self::for_target(Dialect::GlslEs100, GpuVendor::Unknown)
    }

    pub fn with_debug_overlay(mut self, enabled: bool) -> Self {
        self.debug_overlay = enabled;
        self
    }
}
