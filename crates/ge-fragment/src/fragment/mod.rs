pub mod classify;
pub mod shader_gen;
pub mod shader_id;
pub mod uniforms;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::caps::EmitPolicy;
use crate::state::PipelineState;
use crate::stats::DrawCounter;
use classify::FragmentDecisions;
use shader_gen::emit_fragment_shader_for;
use shader_id::{encode_decisions, FragmentShaderId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFragmentShader {
    pub id: FragmentShaderId,
    pub source: String,
}

/// Cache of generated fragment shaders for a single [`EmitPolicy`], keyed by [`FragmentShaderId`].
#[derive(Debug, Default)]
pub struct FragmentShaderCache {
    policy: EmitPolicy,
    shaders: HashMap<FragmentShaderId, Arc<GeneratedFragmentShader>>,
    hits: u64,
    misses: u64,
}

impl FragmentShaderCache {
    pub fn new(policy: EmitPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> EmitPolicy {
        self.policy
    }

    /// Replaces the policy. Cached sources were generated for the old one, so they are dropped.
    pub fn set_policy(&mut self, policy: EmitPolicy) {
        if policy != self.policy {
            self.policy = policy;
            self.shaders.clear();
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }

    /// Returns the shader for `state`, generating it on first use. Every non-clear call is
    /// recorded with `counter`, hit or miss.
    pub fn get_or_create<C: DrawCounter + ?Sized>(
        &mut self,
        state: &PipelineState,
        counter: &C,
    ) -> Arc<GeneratedFragmentShader> {
        let decisions = FragmentDecisions::from_state(state);
        let id = encode_decisions(&decisions);
        if !decisions.clear_mode {
            counter.record_draw(decisions.alpha_test.is_some());
        }

        if let Some(existing) = self.shaders.get(&id) {
            self.hits += 1;
            return Arc::clone(existing);
        }

        let mut source = String::with_capacity(1024);
        // `String` never fails to write.
        let _ = emit_fragment_shader_for(&decisions, &self.policy, &mut source);
        debug!(%id, len = source.len(), "generated fragment shader");

        let generated = Arc::new(GeneratedFragmentShader { id, source });
        self.shaders.insert(id, Arc::clone(&generated));
        self.misses += 1;
        generated
    }
}
