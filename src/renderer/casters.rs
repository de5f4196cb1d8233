use std::collections::HashMap;

use crate::error::{PipelineError, Result};
use crate::renderer::shader_lib;
use crate::scene::RendererId;

/// Shadow atlas slots; also the number of quadrants in the atlas.
pub const MAX_SHADOW_CASTERS: usize = 4;

/// `shadowIndex` value of renderers without a shadow slot.
pub const NO_SHADOW_INDEX: f32 = 0.0;

/// Shader-visible slot bit for a caster slot.
pub fn shadow_index_bit(slot: usize) -> f32 {
    (1u32 << slot) as f32
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowCaster {
    pub renderer: RendererId,
    /// Frustum margin in world units.
    pub padding: f32,
    slot: usize,
}

impl ShadowCaster {
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// Named float overrides of one renderer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PropertyBlock {
    floats: HashMap<&'static str, f32>,
}

impl PropertyBlock {
    pub fn set_float(&mut self, name: &'static str, value: f32) {
        self.floats.insert(name, value);
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.floats.get(name).copied()
    }
}

/// Per-renderer shader properties, read at draw time.
#[derive(Clone, Debug, Default)]
pub struct RendererProperties {
    blocks: HashMap<RendererId, PropertyBlock>,
}

impl RendererProperties {
    pub fn set_float(&mut self, renderer: RendererId, name: &'static str, value: f32) {
        self.blocks.entry(renderer).or_default().set_float(name, value);
    }

    pub fn get_float(&self, renderer: RendererId, name: &str) -> Option<f32> {
        self.blocks
            .get(&renderer)
            .and_then(|block| block.get_float(name))
    }

    pub fn block(&self, renderer: RendererId) -> Option<&PropertyBlock> {
        self.blocks.get(&renderer)
    }

    /// Drops every override of a renderer that no longer exists.
    pub fn remove(&mut self, renderer: RendererId) -> Option<PropertyBlock> {
        self.blocks.remove(&renderer)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn shadow_index(&self, renderer: RendererId) -> f32 {
        self.get_float(renderer, shader_lib::renderer::SHADOW_INDEX)
            .unwrap_or(NO_SHADOW_INDEX)
    }
}

/// Ordered set of live shadow casters.
///
/// Slots are always `0..len()` in list order. Every change re-applies the
/// `shadowIndex` property of the affected renderers so draws in the same frame
/// already see the new slot.
#[derive(Debug, Default)]
pub struct ShadowCasterRegistry {
    casters: Vec<ShadowCaster>,
    properties: RendererProperties,
}

impl ShadowCasterRegistry {
    pub fn new() -> Self {
        Self {
            casters: Vec::with_capacity(MAX_SHADOW_CASTERS),
            properties: RendererProperties::default(),
        }
    }

    pub fn capacity(&self) -> usize {
        MAX_SHADOW_CASTERS
    }

    pub fn len(&self) -> usize {
        self.casters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.casters.is_empty()
    }

    pub fn casters(&self) -> &[ShadowCaster] {
        &self.casters
    }

    pub fn properties(&self) -> &RendererProperties {
        &self.properties
    }

    pub fn slot_of(&self, renderer: RendererId) -> Option<usize> {
        self.casters
            .iter()
            .position(|caster| caster.renderer == renderer)
    }

    /// Appends a caster and returns its slot, or fails when every slot is taken.
    ///
    /// Registering a renderer twice returns its existing slot.
    pub fn try_register(&mut self, renderer: RendererId, padding: f32) -> Result<usize> {
        if let Some(slot) = self.slot_of(renderer) {
            log::debug!("Renderer {:?} already casts shadows from slot {}", renderer, slot);
            self.casters[slot].padding = padding;
            return Ok(slot);
        }

        if self.casters.len() >= MAX_SHADOW_CASTERS {
            return Err(PipelineError::ShadowCasterCapacity {
                capacity: MAX_SHADOW_CASTERS,
            });
        }

        let slot = self.casters.len();
        self.casters.push(ShadowCaster {
            renderer,
            padding,
            slot,
        });
        self.apply_property_block(slot);
        Ok(slot)
    }

    /// Like [`try_register`](Self::try_register) but logs a warning and leaves
    /// the renderer without a slot when the registry is full.
    pub fn register(&mut self, renderer: RendererId, padding: f32) -> Option<usize> {
        match self.try_register(renderer, padding) {
            Ok(slot) => Some(slot),
            Err(err) => {
                log::warn!("{}", err);
                None
            }
        }
    }

    /// Removes a caster and compacts the remaining slots.
    pub fn unregister(&mut self, renderer: RendererId) -> bool {
        let Some(removed) = self.slot_of(renderer) else {
            return false;
        };
        self.casters.remove(removed);

        for slot in 0..self.casters.len() {
            self.casters[slot].slot = slot;
            self.apply_property_block(slot);
        }

        self.properties.set_float(
            renderer,
            shader_lib::renderer::SHADOW_INDEX,
            NO_SHADOW_INDEX,
        );
        true
    }

    /// Unregisters a destroyed renderer and discards its property block.
    pub fn forget(&mut self, renderer: RendererId) -> bool {
        let removed = self.unregister(renderer);
        self.properties.remove(renderer);
        removed
    }

    pub fn set_padding(&mut self, renderer: RendererId, padding: f32) -> bool {
        match self.slot_of(renderer) {
            Some(slot) => {
                self.casters[slot].padding = padding;
                true
            }
            None => false,
        }
    }

    fn apply_property_block(&mut self, slot: usize) {
        let caster = self.casters[slot];
        self.properties.set_float(
            caster.renderer,
            shader_lib::renderer::SHADOW_INDEX,
            shadow_index_bit(caster.slot),
        );
    }
}
