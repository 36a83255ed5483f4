//! Checks that every alpha test the classifier drops is unobservable.

use ge_fragment::fragment::classify::{is_alpha_test_trivially_true, FragmentDecisions};
use ge_fragment::{
    generate_fragment_shader, AlphaTestState, BlendDstFactor, BlendSrcFactor, BlendState,
    CompareFunc, EmitPolicy, PipelineState,
};
use proptest::prelude::*;

/// Weight the destination factor takes on when the source alpha is zero, for factors that read
/// source alpha. `None` for factors that don't.
fn dst_weight_at_zero_alpha(dst: BlendDstFactor) -> Option<f32> {
    match dst {
        BlendDstFactor::SrcAlpha | BlendDstFactor::DoubleSrcAlpha => Some(0.0),
        BlendDstFactor::InvSrcAlpha => Some(1.0),
        BlendDstFactor::DoubleInvSrcAlpha => Some(2.0),
        _ => None,
    }
}

/// A fragment with alpha 0 that the test would reject leaves no trace: no depth/stencil update,
/// the source term is zero, and the destination is not rescaled through source alpha.
fn zero_alpha_fragment_is_invisible(state: &PipelineState) -> bool {
    !state.depth_test_enabled
        && !state.stencil_test_enabled
        && state.blend.enabled
        && state.blend.src == BlendSrcFactor::SrcAlpha
        && dst_weight_at_zero_alpha(state.blend.dst).map_or(true, |w| w == 1.0)
}

/// Reference evaluator: dropping the test must not change the outcome for any fragment alpha.
fn assert_drop_is_sound(state: &PipelineState) {
    let test = &state.alpha_test;
    for alpha in 0..=255u8 {
        let passes = test.func.passes(alpha, test.reference);
        assert!(
            passes || (alpha == 0 && zero_alpha_fragment_is_invisible(state)),
            "dropped {:?} ref {} rejects alpha {alpha} visibly: {state:?}",
            test.func,
            test.reference,
        );
    }
}

fn alpha_state(func: CompareFunc, reference: u8) -> PipelineState {
    PipelineState {
        alpha_test: AlphaTestState {
            enabled: true,
            func,
            reference,
            mask: 0xFF,
        },
        ..Default::default()
    }
}

#[test]
fn exhaustive_references_without_blending() {
    for func in CompareFunc::ALL {
        for reference in 0..=255u8 {
            let state = alpha_state(func, reference);
            if is_alpha_test_trivially_true(&state) {
                assert_drop_is_sound(&state);
            }
        }
    }
}

#[test]
fn exhaustive_blend_depth_stencil_combinations() {
    for func in CompareFunc::ALL {
        for reference in [0u8, 1, 128, 254, 255] {
            for enabled in [false, true] {
                for src in BlendSrcFactor::ALL {
                    for dst in BlendDstFactor::ALL {
                        for (depth, stencil) in
                            [(false, false), (true, false), (false, true), (true, true)]
                        {
                            let state = PipelineState {
                                blend: BlendState { enabled, src, dst },
                                depth_test_enabled: depth,
                                stencil_test_enabled: stencil,
                                ..alpha_state(func, reference)
                            };
                            if is_alpha_test_trivially_true(&state) {
                                assert_drop_is_sound(&state);
                            }
                        }
                    }
                }
            }
        }
    }
}

#[test]
fn never_is_not_trivially_true_and_discards() {
    for reference in 0..=255u8 {
        let state = alpha_state(CompareFunc::Never, reference);
        assert!(!is_alpha_test_trivially_true(&state));
        let glsl = generate_fragment_shader(&state, &EmitPolicy::desktop());
        assert!(glsl.contains("  discard;\n"), "{glsl}");
    }
}

fn arb_compare_func() -> impl Strategy<Value = CompareFunc> {
    prop::sample::select(CompareFunc::ALL.to_vec())
}

fn arb_blend() -> impl Strategy<Value = BlendState> {
    (
        any::<bool>(),
        prop::sample::select(BlendSrcFactor::ALL.to_vec()),
        prop::sample::select(BlendDstFactor::ALL.to_vec()),
    )
        .prop_map(|(enabled, src, dst)| BlendState { enabled, src, dst })
}

proptest! {
    #[test]
    fn randomized_drops_are_sound(
        func in arb_compare_func(),
        reference in any::<u8>(),
        mask in any::<u8>(),
        blend in arb_blend(),
        depth in any::<bool>(),
        stencil in any::<bool>(),
    ) {
        let state = PipelineState {
            alpha_test: AlphaTestState { enabled: true, func, reference, mask },
            blend,
            depth_test_enabled: depth,
            stencil_test_enabled: stencil,
            ..Default::default()
        };
        let decisions = FragmentDecisions::from_state(&state);
        if decisions.alpha_test.is_none() {
            assert_drop_is_sound(&state);
        }

        // The emitted shader discards exactly when a test survived.
        let glsl = generate_fragment_shader(&state, &EmitPolicy::desktop());
        prop_assert_eq!(glsl.contains("discard"), decisions.alpha_test.is_some());
    }
}
