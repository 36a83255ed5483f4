use std::fmt::{self, Write};

use thiserror::Error;
use tracing::trace;

use super::classify::{FragmentDecisions, TextureDecisions};
use crate::caps::{Dialect, EmitPolicy, ShaderQuirks};
use crate::state::{ColorTestFunc, CompareFunc, PipelineState, TextureFunction};

/// Upper bound on the length of any generated fragment shader, excluding the nul terminator.
pub const MAX_FRAGMENT_SHADER_LEN: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmitError {
    #[error(
        "output buffer holds {available} bytes but the shader needs {required} (including the nul terminator)"
    )]
    BufferTooSmall { required: usize, available: usize },
}

/// Generates the fragment shader for `state`.
pub fn generate_fragment_shader(state: &PipelineState, policy: &EmitPolicy) -> String {
    let mut glsl = String::with_capacity(1024);
    generate_fragment_shader_into(state, policy, &mut glsl);
    glsl
}

/// Like [`generate_fragment_shader`], but reuses `out`'s allocation. `out` is cleared first.
pub fn generate_fragment_shader_into(state: &PipelineState, policy: &EmitPolicy, out: &mut String) {
    out.clear();
    let decisions = FragmentDecisions::from_state(state);
    // `String` never fails to write.
    let _ = emit_fragment_shader_for(&decisions, policy, out);
    trace!(
        len = out.len(),
        clear = decisions.clear_mode,
        "generated fragment shader"
    );
}

/// Writes the nul-terminated shader into `buf` and returns its length (without the terminator).
///
/// On [`EmitError::BufferTooSmall`], `buf` holds a truncated, unterminated prefix.
pub fn write_fragment_shader_nul(
    state: &PipelineState,
    policy: &EmitPolicy,
    buf: &mut [u8],
) -> Result<usize, EmitError> {
    let mut w = SliceWriter::new(buf);
    let _ = emit_fragment_shader(state, policy, &mut w);
    w.terminate()
}

/// Length in bytes of the shader [`generate_fragment_shader`] would return.
pub fn fragment_shader_len(state: &PipelineState, policy: &EmitPolicy) -> usize {
    let mut counter = LenCounter(0);
    let _ = emit_fragment_shader(state, policy, &mut counter);
    counter.0
}

pub fn emit_fragment_shader<W: Write + ?Sized>(
    state: &PipelineState,
    policy: &EmitPolicy,
    out: &mut W,
) -> fmt::Result {
    emit_fragment_shader_for(&FragmentDecisions::from_state(state), policy, out)
}

/// Emits GLSL implementing exactly the code paths `decisions` leaves alive.
pub fn emit_fragment_shader_for<W: Write + ?Sized>(
    decisions: &FragmentDecisions,
    policy: &EmitPolicy,
    out: &mut W,
) -> fmt::Result {
    let plan = Plan::new(decisions, policy);
    let dialect = policy.dialect;
    let mediump = dialect.mediump();

    out.write_str(dialect.version_directive())?;
    if let Some(precision) = dialect.precision_directive() {
        out.write_str(precision)?;
    }

    // Declarations.
    let texture = decisions.texture;
    if texture.is_some() {
        out.write_str("uniform sampler2D tex;\n")?;
    }
    if plan.uses_reference() {
        writeln!(out, "uniform {mediump}vec4 u_alphacolorref;")?;
    }
    if plan.uses_color_mask() {
        out.write_str("uniform vec4 u_colormask;\n")?;
    }
    if texture.is_some_and(|t| t.function == TextureFunction::Blend) {
        out.write_str("uniform vec3 u_texenv;\n")?;
    }
    out.write_str("varying vec4 v_color0;\n")?;
    if decisions.secondary_color {
        out.write_str("varying vec3 v_color1;\n")?;
    }
    if decisions.fog {
        out.write_str("uniform vec3 u_fogcolor;\n")?;
        writeln!(out, "varying {mediump}float v_fogdepth;")?;
    }
    if let Some(tex) = texture {
        if tex.projected {
            out.write_str("varying vec3 v_texcoord;\n")?;
        } else {
            out.write_str("varying vec2 v_texcoord;\n")?;
        }
    }

    // Quantization helpers.
    let quantizer = Quantizer::for_policy(policy);
    if matches!(plan.alpha, Some(TestCode::Compare(_))) {
        quantizer.emit_scalar(out, dialect)?;
    }
    if matches!(plan.color, Some(TestCode::Compare(_))) {
        quantizer.emit_vector(out, dialect)?;
    }

    out.write_str("void main() {\n")?;
    if decisions.clear_mode {
        // Clear mode writes the primary color and nothing else.
        out.write_str("  gl_FragColor = v_color0;\n")?;
    } else {
        emit_color(out, decisions)?;

        match plan.alpha {
            Some(TestCode::DiscardAll) => out.write_str("  discard;\n")?,
            Some(TestCode::Compare(op)) => writeln!(
                out,
                "  if (!({}(v.a) {op} u_alphacolorref.a)) discard;",
                quantizer.scalar_fn()
            )?,
            None => {}
        }

        match (decisions.color_doubling, decisions.alpha_doubling) {
            (true, true) => out.write_str("  v = v * 2.0;\n")?,
            (true, false) => out.write_str("  v.rgb = v.rgb * 2.0;\n")?,
            (false, true) => out.write_str("  v.a = v.a * 2.0;\n")?,
            (false, false) => {}
        }

        match plan.color {
            Some(TestCode::DiscardAll) => out.write_str("  discard;\n")?,
            Some(TestCode::Compare(op)) => writeln!(
                out,
                "  if (!({}(v.rgb) * u_colormask.rgb {op} u_alphacolorref.rgb * u_colormask.rgb)) discard;",
                quantizer.vector_fn()
            )?,
            None => {}
        }

        if decisions.fog {
            out.write_str("  float fogCoef = clamp(v_fogdepth, 0.0, 1.0);\n")?;
            out.write_str("  gl_FragColor = mix(vec4(u_fogcolor, v.a), v, fogCoef);\n")?;
        } else {
            out.write_str("  gl_FragColor = v;\n")?;
        }
    }

    if policy.debug_overlay {
        if texture.is_some() {
            out.write_str("  gl_FragColor = texture2D(tex, v_texcoord.xy);\n")?;
            out.write_str("  gl_FragColor += vec4(0.3, 0.0, 0.3, 0.3);\n")?;
        } else {
            out.write_str("  gl_FragColor = vec4(1.0, 0.0, 1.0, 1.0);\n")?;
        }
    }
    out.write_str("}\n")
}

/// Emits the declaration of the working color `v`.
fn emit_color<W: Write + ?Sized>(out: &mut W, decisions: &FragmentDecisions) -> fmt::Result {
    // Specular is added on top of the textured color.
    let secondary = if decisions.secondary_color {
        out.write_str("  vec4 s = vec4(v_color1, 0.0);\n")?;
        " + s"
    } else {
        ""
    };

    let Some(tex) = decisions.texture else {
        return writeln!(out, "  vec4 v = v_color0{secondary};");
    };

    if tex.projected {
        out.write_str("  vec4 t = texture2DProj(tex, v_texcoord);\n")?;
    } else {
        out.write_str("  vec4 t = texture2D(tex, v_texcoord);\n")?;
    }
    out.write_str("  vec4 p = v_color0;\n")?;

    match texture_combine_expr(tex) {
        Some(expr) => writeln!(out, "  vec4 v = {expr}{secondary};"),
        None => out.write_str("  vec4 v = p;\n"),
    }
}

/// Combines texel `t` with primary color `p`. `None` for the reserved functions, which pass `p`
/// through untouched.
fn texture_combine_expr(tex: TextureDecisions) -> Option<&'static str> {
    let expr = if tex.rgba {
        match tex.function {
            TextureFunction::Modulate => "p * t",
            TextureFunction::Decal => "vec4(mix(p.rgb, t.rgb, t.a), p.a)",
            TextureFunction::Blend => "vec4(mix(p.rgb, u_texenv.rgb, t.rgb), p.a * t.a)",
            TextureFunction::Replace => "t",
            TextureFunction::Add => "vec4(p.rgb + t.rgb, p.a * t.a)",
            _ => return None,
        }
    } else {
        // RGB textures: texel alpha is treated as 1. BLEND still multiplies by `t.a` to match the
        // emulated unit.
        match tex.function {
            TextureFunction::Modulate => "vec4(t.rgb * p.rgb, p.a)",
            TextureFunction::Decal => "vec4(t.rgb, p.a)",
            TextureFunction::Blend => "vec4(mix(p.rgb, u_texenv.rgb, t.rgb), p.a * t.a)",
            TextureFunction::Replace => "vec4(t.rgb, p.a)",
            TextureFunction::Add => "vec4(p.rgb + t.rgb, p.a)",
            _ => return None,
        }
    };
    Some(expr)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TestCode {
    /// The test rejects every fragment.
    DiscardAll,
    /// Discard unless `quantized <op> reference`.
    Compare(&'static str),
}

/// Which test code survives for a given policy.
struct Plan {
    alpha: Option<TestCode>,
    color: Option<TestCode>,
}

impl Plan {
    fn new(decisions: &FragmentDecisions, policy: &EmitPolicy) -> Self {
        let alpha = decisions.alpha_test.and_then(|func| match func {
            CompareFunc::Never => Some(TestCode::DiscardAll),
            CompareFunc::Always => None,
            CompareFunc::Equal => Some(TestCode::Compare("==")),
            // NOTEQUAL is the test that discards on equality.
            CompareFunc::NotEqual
                if policy.quirks.contains(ShaderQuirks::NO_EQUALITY_DISCARD) =>
            {
                None
            }
            CompareFunc::NotEqual => Some(TestCode::Compare("!=")),
            CompareFunc::Less => Some(TestCode::Compare("<")),
            CompareFunc::LessEqual => Some(TestCode::Compare("<=")),
            CompareFunc::Greater => Some(TestCode::Compare(">")),
            CompareFunc::GreaterEqual => Some(TestCode::Compare(">=")),
        });
        let color = decisions.color_test.and_then(|func| match func {
            ColorTestFunc::Never => Some(TestCode::DiscardAll),
            ColorTestFunc::Always => None,
            ColorTestFunc::Equal => Some(TestCode::Compare("==")),
            ColorTestFunc::NotEqual => Some(TestCode::Compare("!=")),
        });
        Self { alpha, color }
    }

    fn uses_reference(&self) -> bool {
        matches!(self.alpha, Some(TestCode::Compare(_)))
            || matches!(self.color, Some(TestCode::Compare(_)))
    }

    fn uses_color_mask(&self) -> bool {
        matches!(self.color, Some(TestCode::Compare(_)))
    }
}

/// Float → 8-bit grid rounding. Both variants return values on the 0..=255 grid so the reference
/// uniform has one convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantizer {
    /// `floor(x * 255.0 + 0.5)`.
    Floor,
    /// `x + 0.5/255` snapped down with `fract`.
    Biased,
}

impl Quantizer {
    fn for_policy(policy: &EmitPolicy) -> Self {
        if policy.quirks.contains(ShaderQuirks::BIASED_ROUNDING) {
            Quantizer::Biased
        } else {
            Quantizer::Floor
        }
    }

    fn scalar_fn(self) -> &'static str {
        match self {
            Quantizer::Floor => "roundAndScaleTo255f",
            Quantizer::Biased => "roundTo255thf",
        }
    }

    fn vector_fn(self) -> &'static str {
        match self {
            Quantizer::Floor => "roundAndScaleTo255v",
            Quantizer::Biased => "roundTo255thv",
        }
    }

    fn emit_scalar<W: Write + ?Sized>(self, out: &mut W, dialect: Dialect) -> fmt::Result {
        self.emit(out, dialect, "float", self.scalar_fn())
    }

    fn emit_vector<W: Write + ?Sized>(self, out: &mut W, dialect: Dialect) -> fmt::Result {
        self.emit(out, dialect, "vec3", self.vector_fn())
    }

    fn emit<W: Write + ?Sized>(
        self,
        out: &mut W,
        dialect: Dialect,
        ty: &str,
        name: &str,
    ) -> fmt::Result {
        let mp = dialect.mediump();
        match self {
            Quantizer::Floor => writeln!(
                out,
                "{mp}{ty} {name}(in {mp}{ty} x) {{ return floor(x * 255.0 + 0.5); }}"
            ),
            Quantizer::Biased => writeln!(
                out,
                "{mp}{ty} {name}(in {mp}{ty} x) {{ {mp}{ty} y = x + (0.5 / 255.0); return (y - fract(y * 255.0) * (1.0 / 255.0)) * 255.0; }}"
            ),
        }
    }
}

/// Counts bytes without storing them.
struct LenCounter(usize);

impl Write for LenCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

/// Writes into a fixed buffer, keeping one byte for the terminator. Keeps counting past the end
/// so the caller learns the required size.
struct SliceWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> SliceWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    fn terminate(self) -> Result<usize, EmitError> {
        let required = self.len + 1;
        if required > self.buf.len() {
            return Err(EmitError::BufferTooSmall {
                required,
                available: self.buf.len(),
            });
        }
        self.buf[self.len] = 0;
        Ok(self.len)
    }
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let bytes = s.as_bytes();
        let capacity = self.buf.len().saturating_sub(1);
        if self.len < capacity {
            let n = bytes.len().min(capacity - self.len);
            self.buf[self.len..self.len + n].copy_from_slice(&bytes[..n]);
        }
        self.len += bytes.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caps::GpuVendor;
    use crate::state::{AlphaTestState, ColorTestState, UvGenMode};
    use pretty_assertions::assert_eq;

    fn textured(function: TextureFunction, rgba: bool) -> PipelineState {
        PipelineState {
            texture_enabled: true,
            texture_function: function,
            texture_alpha_used: rgba,
            ..Default::default()
        }
    }

    fn combine_line(state: &PipelineState) -> String {
        let glsl = generate_fragment_shader(state, &EmitPolicy::desktop());
        glsl.lines()
            .find(|l| l.starts_with("  vec4 v = "))
            .unwrap_or_else(|| panic!("no combine line in:\n{glsl}"))
            .to_string()
    }

    #[test]
    fn untextured_unlit_desktop_shader() {
        let glsl = generate_fragment_shader(&PipelineState::default(), &EmitPolicy::desktop());
        assert_eq!(
            glsl,
            concat!(
                "#version 110\n",
                "varying vec4 v_color0;\n",
                "void main() {\n",
                "  vec4 v = v_color0;\n",
                "  gl_FragColor = v;\n",
                "}\n",
            )
        );
    }

    #[test]
    fn rgba_texture_functions() {
        let cases = [
            (TextureFunction::Modulate, "  vec4 v = p * t;"),
            (
                TextureFunction::Decal,
                "  vec4 v = vec4(mix(p.rgb, t.rgb, t.a), p.a);",
            ),
            (
                TextureFunction::Blend,
                "  vec4 v = vec4(mix(p.rgb, u_texenv.rgb, t.rgb), p.a * t.a);",
            ),
            (TextureFunction::Replace, "  vec4 v = t;"),
            (TextureFunction::Add, "  vec4 v = vec4(p.rgb + t.rgb, p.a * t.a);"),
            (TextureFunction::Reserved6, "  vec4 v = p;"),
        ];
        for (function, expected) in cases {
            assert_eq!(combine_line(&textured(function, true)), expected, "{function}");
        }
    }

    #[test]
    fn rgb_texture_functions() {
        let cases = [
            (TextureFunction::Modulate, "  vec4 v = vec4(t.rgb * p.rgb, p.a);"),
            (TextureFunction::Decal, "  vec4 v = vec4(t.rgb, p.a);"),
            (
                TextureFunction::Blend,
                "  vec4 v = vec4(mix(p.rgb, u_texenv.rgb, t.rgb), p.a * t.a);",
            ),
            (TextureFunction::Replace, "  vec4 v = vec4(t.rgb, p.a);"),
            (TextureFunction::Add, "  vec4 v = vec4(p.rgb + t.rgb, p.a);"),
            (TextureFunction::Reserved5, "  vec4 v = p;"),
        ];
        for (function, expected) in cases {
            assert_eq!(combine_line(&textured(function, false)), expected, "{function}");
        }
    }

    #[test]
    fn secondary_color_added_to_every_defined_combine() {
        for function in TextureFunction::ALL {
            for rgba in [false, true] {
                let state = PipelineState {
                    lighting_enabled: true,
                    secondary_color: true,
                    ..textured(function, rgba)
                };
                let line = combine_line(&state);
                assert_eq!(
                    line.ends_with(" + s;"),
                    !function.is_reserved(),
                    "{function} rgba={rgba}: {line}"
                );
            }
        }

        let untextured = PipelineState {
            lighting_enabled: true,
            secondary_color: true,
            ..Default::default()
        };
        assert_eq!(combine_line(&untextured), "  vec4 v = v_color0 + s;");
    }

    #[test]
    fn projected_texture_uses_texture2dproj_and_vec3_coords() {
        let state = PipelineState {
            uv_gen_mode: UvGenMode::TextureMatrix,
            ..textured(TextureFunction::Modulate, true)
        };
        let glsl = generate_fragment_shader(&state, &EmitPolicy::desktop());
        assert!(glsl.contains("varying vec3 v_texcoord;\n"));
        assert!(glsl.contains("  vec4 t = texture2DProj(tex, v_texcoord);\n"));
        assert!(!glsl.contains("vec2 v_texcoord"));
    }

    #[test]
    fn doubling_variants() {
        let base = PipelineState::default();
        let doubled_color = PipelineState {
            color_doubling: true,
            ..base
        };
        let doubled_alpha = PipelineState {
            blend: crate::state::BlendState {
                enabled: true,
                src: crate::state::BlendSrcFactor::DoubleSrcAlpha,
                dst: crate::state::BlendDstFactor::Fixed,
            },
            ..base
        };
        let both = PipelineState {
            color_doubling: true,
            ..doubled_alpha
        };
        let policy = EmitPolicy::desktop();

        let glsl = generate_fragment_shader(&doubled_color, &policy);
        assert!(glsl.contains("  v.rgb = v.rgb * 2.0;\n"));
        let glsl = generate_fragment_shader(&doubled_alpha, &policy);
        assert!(glsl.contains("  v.a = v.a * 2.0;\n"));
        let glsl = generate_fragment_shader(&both, &policy);
        assert!(glsl.contains("  v = v * 2.0;\n"));
        let glsl = generate_fragment_shader(&base, &policy);
        assert!(!glsl.contains("2.0;"));
    }

    #[test]
    fn alpha_and_color_tests_with_fog_on_embedded() {
        let state = PipelineState {
            alpha_test: AlphaTestState {
                enabled: true,
                func: CompareFunc::Less,
                reference: 0x40,
                mask: 0xFF,
            },
            color_test: ColorTestState {
                enabled: true,
                func: ColorTestFunc::NotEqual,
                ..Default::default()
            },
            fog_enabled: true,
            ..Default::default()
        };
        let glsl = generate_fragment_shader(&state, &EmitPolicy::embedded());
        assert_eq!(
            glsl,
            concat!(
                "#version 100\n",
                "precision lowp float;\n",
                "uniform mediump vec4 u_alphacolorref;\n",
                "uniform vec4 u_colormask;\n",
                "varying vec4 v_color0;\n",
                "uniform vec3 u_fogcolor;\n",
                "varying mediump float v_fogdepth;\n",
                "mediump float roundAndScaleTo255f(in mediump float x) { return floor(x * 255.0 + 0.5); }\n",
                "mediump vec3 roundAndScaleTo255v(in mediump vec3 x) { return floor(x * 255.0 + 0.5); }\n",
                "void main() {\n",
                "  vec4 v = v_color0;\n",
                "  if (!(roundAndScaleTo255f(v.a) < u_alphacolorref.a)) discard;\n",
                "  if (!(roundAndScaleTo255v(v.rgb) * u_colormask.rgb != u_alphacolorref.rgb * u_colormask.rgb)) discard;\n",
                "  float fogCoef = clamp(v_fogdepth, 0.0, 1.0);\n",
                "  gl_FragColor = mix(vec4(u_fogcolor, v.a), v, fogCoef);\n",
                "}\n",
            )
        );
    }

    #[test]
    fn biased_rounding_for_powervr() {
        let state = PipelineState {
            alpha_test: AlphaTestState {
                enabled: true,
                func: CompareFunc::Greater,
                reference: 0x10,
                mask: 0xFF,
            },
            color_test: ColorTestState {
                enabled: true,
                func: ColorTestFunc::Equal,
                ..Default::default()
            },
            ..Default::default()
        };
        let policy = EmitPolicy::for_target(Dialect::GlslEs100, GpuVendor::PowerVr);
        let glsl = generate_fragment_shader(&state, &policy);
        assert!(glsl.contains(
            "mediump float roundTo255thf(in mediump float x) { mediump float y = x + (0.5 / 255.0); return (y - fract(y * 255.0) * (1.0 / 255.0)) * 255.0; }\n"
        ));
        assert!(glsl.contains(
            "mediump vec3 roundTo255thv(in mediump vec3 x) { mediump vec3 y = x + (0.5 / 255.0); return (y - fract(y * 255.0) * (1.0 / 255.0)) * 255.0; }\n"
        ));
        assert!(glsl.contains("  if (!(roundTo255thf(v.a) > u_alphacolorref.a)) discard;\n"));
        assert!(!glsl.contains("roundAndScaleTo255"));
    }

    #[test]
    fn equality_discard_skipped_with_quirk() {
        let alpha = |func| PipelineState {
            alpha_test: AlphaTestState {
                enabled: true,
                func,
                reference: 0x80,
                mask: 0xFF,
            },
            ..Default::default()
        };
        let powervr = EmitPolicy::for_target(Dialect::GlslEs100, GpuVendor::PowerVr);

        // NOTEQUAL discards when alpha equals the reference: dropped.
        let glsl = generate_fragment_shader(&alpha(CompareFunc::NotEqual), &powervr);
        assert!(!glsl.contains("discard"), "{glsl}");
        assert!(!glsl.contains("u_alphacolorref"), "{glsl}");
        assert!(!glsl.contains("roundTo255thf"), "{glsl}");

        // EQUAL is still emitted.
        let glsl = generate_fragment_shader(&alpha(CompareFunc::Equal), &powervr);
        assert!(glsl.contains("  if (!(roundTo255thf(v.a) == u_alphacolorref.a)) discard;\n"));

        let glsl = generate_fragment_shader(&alpha(CompareFunc::NotEqual), &EmitPolicy::embedded());
        assert!(glsl.contains("  if (!(roundAndScaleTo255f(v.a) != u_alphacolorref.a)) discard;\n"));
    }

    #[test]
    fn never_tests_discard_unconditionally() {
        let state = PipelineState {
            alpha_test: AlphaTestState {
                enabled: true,
                func: CompareFunc::Never,
                ..Default::default()
            },
            ..Default::default()
        };
        let glsl = generate_fragment_shader(&state, &EmitPolicy::desktop());
        assert!(glsl.contains("  discard;\n"));
        assert!(!glsl.contains("u_alphacolorref"));

        let state = PipelineState {
            color_test: ColorTestState {
                enabled: true,
                func: ColorTestFunc::Never,
                ..Default::default()
            },
            ..Default::default()
        };
        let glsl = generate_fragment_shader(&state, &EmitPolicy::desktop());
        assert!(glsl.contains("  discard;\n"));
        assert!(!glsl.contains("u_colormask"));
    }

    #[test]
    fn debug_overlay_replaces_output() {
        let policy = EmitPolicy::desktop().with_debug_overlay(true);
        let glsl = generate_fragment_shader(&textured(TextureFunction::Modulate, true), &policy);
        assert!(glsl.ends_with(concat!(
            "  gl_FragColor = v;\n",
            "  gl_FragColor = texture2D(tex, v_texcoord.xy);\n",
            "  gl_FragColor += vec4(0.3, 0.0, 0.3, 0.3);\n",
            "}\n",
        )));
        let glsl = generate_fragment_shader(&PipelineState::default(), &policy);
        assert!(glsl.ends_with("  gl_FragColor = vec4(1.0, 0.0, 1.0, 1.0);\n}\n"));
    }

    #[test]
    fn nul_terminated_write_fits_exactly() {
        let state = textured(TextureFunction::Decal, true);
        let policy = EmitPolicy::embedded();
        let expected = generate_fragment_shader(&state, &policy);
        assert_eq!(fragment_shader_len(&state, &policy), expected.len());

        let mut buf = vec![0xAAu8; expected.len() + 1];
        let len = write_fragment_shader_nul(&state, &policy, &mut buf).unwrap();
        assert_eq!(len, expected.len());
        assert_eq!(&buf[..len], expected.as_bytes());
        assert_eq!(buf[len], 0);
    }

    #[test]
    fn nul_terminated_write_reports_required_size() {
        let state = PipelineState::default();
        let policy = EmitPolicy::desktop();
        let needed = fragment_shader_len(&state, &policy) + 1;

        let mut buf = vec![0u8; needed - 1];
        assert_eq!(
            write_fragment_shader_nul(&state, &policy, &mut buf),
            Err(EmitError::BufferTooSmall {
                required: needed,
                available: needed - 1,
            })
        );

        let mut empty: [u8; 0] = [];
        assert_eq!(
            write_fragment_shader_nul(&state, &policy, &mut empty),
            Err(EmitError::BufferTooSmall {
                required: needed,
                available: 0,
            })
        );
    }

    #[test]
    fn generate_into_reuses_buffer() {
        let mut out = String::from("stale contents");
        generate_fragment_shader_into(&PipelineState::default(), &EmitPolicy::desktop(), &mut out);
        assert!(out.starts_with("#version 110\n"));
        assert!(!out.contains("stale"));
    }
}
