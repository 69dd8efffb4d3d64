//! Integration tests for the draw-target synchronization state machine.
//!
//! A scripted scene delegate feeds attribute values; the tests drive
//! `DrawTarget::sync` with selected dirty bits and check the resulting
//! framebuffer, version counter and render-pass state.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use prism_graphics::backend::software::SoftwareBackend;
use prism_graphics::draw_target::{tokens, AttachmentDesc, AttachmentDescList};
use prism_graphics::scene::{Camera, Collection, RenderIndex, SceneDelegate, ScenePath, Value};
use prism_graphics::{DrawTarget, DrawTargetDirty, Extent2d, SamplerDescriptor, TextureFormat};

/// Scene delegate serving a fixed attribute table.
struct TestDelegate {
    render_index: RenderIndex,
    values: HashMap<(ScenePath, String), Value>,
}

impl TestDelegate {
    fn new() -> Self {
        Self {
            render_index: RenderIndex::new(),
            values: HashMap::new(),
        }
    }

    fn set(&mut self, id: &ScenePath, attribute: &str, value: Value) {
        self.values
            .insert((id.clone(), attribute.to_string()), value);
    }
}

impl SceneDelegate for TestDelegate {
    fn get(&self, id: &ScenePath, attribute: &str) -> Value {
        self.values
            .get(&(id.clone(), attribute.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn render_index(&self) -> &RenderIndex {
        &self.render_index
    }
}

fn color_attachments() -> AttachmentDescList {
    AttachmentDescList::new()
        .with_attachment(
            AttachmentDesc::new("color", TextureFormat::Rgba8Unorm)
                .with_clear_color(0.1, 0.2, 0.3, 1.0)
                .with_sampler(SamplerDescriptor::linear()),
        )
        .with_depth_sampler(SamplerDescriptor::nearest())
}

/// A delegate scripted with a full draw-target configuration.
fn configured_delegate(id: &ScenePath) -> TestDelegate {
    let mut delegate = TestDelegate::new();
    delegate.set(id, tokens::RESOLUTION, Value::Extent(Extent2d::new(64, 64)));
    delegate.set(id, tokens::CAMERA, Value::Path(ScenePath::new("/cameras/main")));
    delegate.set(id, tokens::ATTACHMENTS, Value::Attachments(color_attachments()));
    delegate.set(
        id,
        tokens::COLLECTION,
        Value::Collections(vec![Collection::new("shadow_casters")]),
    );
    delegate
}

fn new_draw_target(id: &ScenePath) -> DrawTarget {
    DrawTarget::new(id.clone(), Arc::new(SoftwareBackend::new()))
}

/// Route diagnostics through the test harness; failures are reported as
/// warnings, not panics, so `RUST_LOG=warn` is the way to watch them.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_first_sync_configures_everything() {
    let id = ScenePath::new("/targets/first_sync");
    let delegate = configured_delegate(&id);
    let mut draw_target = new_draw_target(&id);

    let mut bits = DrawTarget::initial_dirty_bits();
    draw_target.sync(&delegate, &mut bits);

    assert!(bits.is_empty());
    assert!(draw_target.is_enabled());
    assert_eq!(draw_target.resolution(), Extent2d::new(64, 64));
    assert_eq!(draw_target.camera_id().as_str(), "/cameras/main");
    assert_eq!(draw_target.version(), 2);

    let framebuffer = draw_target.framebuffer().unwrap();
    assert_eq!(framebuffer.size(), Extent2d::new(64, 64));
    let names: Vec<_> = framebuffer.attachments().iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["color", tokens::DEPTH_ATTACHMENT_NAME]);

    let state = draw_target.render_pass_state();
    assert_eq!(state.camera().as_str(), "/cameras/main");
    assert_eq!(state.color_clear_values().len(), 1);
    assert_eq!(state.collection().unwrap().name(), "shadow_casters");
    // Marking the collection dirty went through the change tracker.
    assert_eq!(
        delegate.render_index().change_tracker().collection_version("shadow_casters"),
        1
    );
}

#[test]
fn test_depth_is_always_the_last_attachment() {
    let id = ScenePath::new("/targets/depth_last");
    let mut delegate = configured_delegate(&id);
    delegate.set(
        &id,
        tokens::ATTACHMENTS,
        Value::Attachments(
            AttachmentDescList::new()
                .with_attachment(AttachmentDesc::new("color", TextureFormat::Rgba8Unorm))
                .with_attachment(AttachmentDesc::new("normals", TextureFormat::Rgba32Float))
                .with_attachment(AttachmentDesc::new("id", TextureFormat::R32Sint)),
        ),
    );
    let mut draw_target = new_draw_target(&id);

    let mut bits = DrawTarget::initial_dirty_bits();
    draw_target.sync(&delegate, &mut bits);

    let framebuffer = draw_target.framebuffer().unwrap();
    let names: Vec<_> = framebuffer.attachments().iter().map(|a| a.name()).collect();
    assert_eq!(names, vec!["color", "normals", "id", tokens::DEPTH_ATTACHMENT_NAME]);
    assert_eq!(
        framebuffer.attachments().last().unwrap().format(),
        TextureFormat::Depth32Float
    );
}

#[test]
fn test_resolution_only_sync_resizes_in_place() {
    let id = ScenePath::new("/targets/resize");
    let mut delegate = configured_delegate(&id);
    let mut draw_target = new_draw_target(&id);

    let mut bits = DrawTarget::initial_dirty_bits();
    draw_target.sync(&delegate, &mut bits);
    let version_after_configure = draw_target.version();
    let attachment_count = draw_target.framebuffer().unwrap().attachments().len();

    delegate.set(&id, tokens::RESOLUTION, Value::Extent(Extent2d::new(128, 128)));
    let mut bits = DrawTargetDirty::RESOLUTION;
    draw_target.sync(&delegate, &mut bits);

    assert!(bits.is_empty());
    assert_eq!(draw_target.version(), version_after_configure + 1);
    let framebuffer = draw_target.framebuffer().unwrap();
    assert_eq!(framebuffer.size(), Extent2d::new(128, 128));
    // Same attachment set, no reinitialization.
    assert_eq!(framebuffer.attachments().len(), attachment_count);
    assert_eq!(
        framebuffer.read_attachment("color").unwrap().len(),
        128 * 128 * 4
    );
}

#[test]
fn test_resolution_before_first_attachment_sync_does_not_resize() {
    let id = ScenePath::new("/targets/early_resolution");
    let delegate = configured_delegate(&id);
    let mut draw_target = new_draw_target(&id);

    let mut bits = DrawTargetDirty::RESOLUTION;
    draw_target.sync(&delegate, &mut bits);

    // No framebuffer yet, so nothing to resize and no version bump.
    assert_eq!(draw_target.version(), 1);
    assert!(draw_target.framebuffer().is_none());
    assert_eq!(draw_target.resolution(), Extent2d::new(64, 64));
}

#[test]
fn test_two_collections_is_an_error_but_first_wins() {
    let id = ScenePath::new("/targets/two_collections");
    let mut delegate = configured_delegate(&id);
    delegate.set(
        &id,
        tokens::COLLECTION,
        Value::Collections(vec![
            Collection::new("first"),
            Collection::new("second"),
        ]),
    );
    let mut draw_target = new_draw_target(&id);

    let mut bits = DrawTarget::initial_dirty_bits();
    draw_target.sync(&delegate, &mut bits);

    assert_eq!(draw_target.collections().len(), 2);
    assert_eq!(
        draw_target.render_pass_state().collection().unwrap().name(),
        "first"
    );
    // Both collections were still marked dirty.
    let tracker = delegate.render_index().change_tracker();
    assert_eq!(tracker.collection_version("first"), 1);
    assert_eq!(tracker.collection_version("second"), 1);
}

#[test]
fn test_enable_and_depth_clear_updates() {
    let id = ScenePath::new("/targets/flags");
    let mut delegate = configured_delegate(&id);
    delegate.set(&id, tokens::ENABLE, Value::Bool(false));
    delegate.set(&id, tokens::DEPTH_CLEAR_VALUE, Value::Float(0.0));
    let mut draw_target = new_draw_target(&id);

    let mut bits = DrawTargetDirty::ENABLE | DrawTargetDirty::DEPTH_CLEAR_VALUE;
    draw_target.sync(&delegate, &mut bits);

    assert!(!draw_target.is_enabled());
    assert_eq!(draw_target.render_pass_state().depth_clear_value(), 0.0);
    // Nothing attachment-related happened.
    assert_eq!(draw_target.version(), 1);
    assert!(draw_target.framebuffer().is_none());
}

#[test]
fn test_write_to_file_reports_missing_pieces() {
    init_logging();
    let id = ScenePath::new("/targets/write_failures");
    let delegate = configured_delegate(&id);
    let mut draw_target = new_draw_target(&id);
    let path = std::env::temp_dir().join("prism_write_failures.png");

    // No framebuffer yet.
    assert!(!draw_target.write_to_file(delegate.render_index(), "color", &path));

    let mut bits = DrawTarget::initial_dirty_bits();
    draw_target.sync(&delegate, &mut bits);

    // Missing attachment.
    assert!(!draw_target.write_to_file(delegate.render_index(), "normals", &path));
    // Camera not registered in the render index.
    assert!(!draw_target.write_to_file(delegate.render_index(), "color", &path));
    assert!(!path.exists());
}

#[test]
fn test_write_to_file_dumps_color_attachment() {
    init_logging();
    let id = ScenePath::new("/targets/write_color");
    let delegate = configured_delegate(&id);
    let mut draw_target = new_draw_target(&id);

    let mut bits = DrawTarget::initial_dirty_bits();
    draw_target.sync(&delegate, &mut bits);

    delegate.render_index().insert_camera(Arc::new(Camera::new(
        ScenePath::new("/cameras/main"),
        glam::Mat4::IDENTITY,
        glam::Mat4::IDENTITY,
    )));

    let path = std::env::temp_dir().join("prism_write_color.png");
    assert!(draw_target.write_to_file(delegate.render_index(), "color", &path));

    let image = image::open(&path).unwrap();
    assert_eq!(image.width(), 64);
    assert_eq!(image.height(), 64);
    std::fs::remove_file(&path).ok();
}

#[test]
fn test_collect_returns_targets_in_path_order() {
    let render_index = RenderIndex::new();
    for name in ["/targets/b", "/targets/a"] {
        let id = ScenePath::new(name);
        render_index.insert_draw_target(
            id.clone(),
            Arc::new(RwLock::new(new_draw_target(&id))),
        );
    }

    let draw_targets = DrawTarget::collect(&render_index);
    assert_eq!(draw_targets.len(), 2);
    assert_eq!(draw_targets[0].read().id().as_str(), "/targets/a");
    assert_eq!(draw_targets[1].read().id().as_str(), "/targets/b");
}
