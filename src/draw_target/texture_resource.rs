//! Draw-target texture resources and their process-wide registry.
//!
//! Every attachment of every draw target is published as a shared texture
//! resource so shading networks can sample it by id. Resources are
//! deduplicated in a content-keyed registry: the id derives from
//! (draw-target path, attachment name), creation is first-writer-wins, and
//! concurrent registrations of the same key serialize on a per-key lock
//! while distinct keys proceed in parallel.

use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::backend::GpuTexture;
use crate::scene::ScenePath;
use crate::types::SamplerDescriptor;

/// Identity of a draw-target texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureResourceId(u64);

impl TextureResourceId {
    /// Derive the id for one attachment of one draw target.
    pub fn for_attachment(draw_target: &ScenePath, attachment: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        draw_target.append_property(attachment).hash(&mut hasher);
        Self(hasher.finish())
    }
}

/// A shared, reference-counted texture resource backed by a draw-target
/// attachment.
///
/// The registry and every interested draw target hold references; the
/// object is freed on last release. The backing texture handle is swapped
/// whenever the owning draw target rebuilds its attachments.
#[derive(Debug, Default)]
pub struct DrawTargetTextureResource {
    texture: Mutex<Option<GpuTexture>>,
    sampler: Mutex<SamplerDescriptor>,
}

impl DrawTargetTextureResource {
    /// Create an empty resource (no attachment bound yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the resource to an attachment texture.
    pub fn set_attachment(&self, texture: GpuTexture) {
        *self.texture.lock() = Some(texture);
    }

    /// The bound attachment texture, if any.
    pub fn texture(&self) -> Option<GpuTexture> {
        self.texture.lock().clone()
    }

    /// Set the sampler state used when the attachment is read back.
    pub fn set_sampler(&self, sampler: SamplerDescriptor) {
        *self.sampler.lock() = sampler;
    }

    /// The sampler state.
    pub fn sampler(&self) -> SamplerDescriptor {
        *self.sampler.lock()
    }
}

type Slot = Arc<Mutex<Option<Arc<DrawTargetTextureResource>>>>;

fn registry() -> &'static Mutex<HashMap<TextureResourceId, Slot>> {
    static REGISTRY: OnceLock<Mutex<HashMap<TextureResourceId, Slot>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Return the resource registered under `id`, creating it if this caller
/// is the first registrant.
///
/// The outer registry lock is held only long enough to find or insert the
/// key's slot; construction happens under the per-key lock, so callers
/// racing on the same key block until the first registrant finishes while
/// distinct keys do not contend.
pub fn register_or_create(id: TextureResourceId) -> Arc<DrawTargetTextureResource> {
    let slot = registry().lock().entry(id).or_default().clone();
    let mut slot = slot.lock();
    match &*slot {
        Some(resource) => resource.clone(),
        None => {
            let resource = Arc::new(DrawTargetTextureResource::new());
            *slot = Some(resource.clone());
            resource
        }
    }
}

static_assertions::assert_impl_all!(DrawTargetTextureResource: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_key_yields_same_resource() {
        let id = TextureResourceId::for_attachment(&ScenePath::new("/t/same"), "color");
        let a = register_or_create(id);
        let b = register_or_create(id);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_distinct_keys_yield_distinct_resources() {
        let path = ScenePath::new("/t/distinct");
        let a = register_or_create(TextureResourceId::for_attachment(&path, "color"));
        let b = register_or_create(TextureResourceId::for_attachment(&path, "depth"));
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_first_writer_wins_under_contention() {
        let id = TextureResourceId::for_attachment(&ScenePath::new("/t/race"), "color");
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(move || register_or_create(id)))
            .collect();
        let resources: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for resource in &resources[1..] {
            assert!(Arc::ptr_eq(&resources[0], resource));
        }
    }
}
