//! GPU context registry.
//!
//! GPU operations are not thread-safe across contexts: every multi-step
//! sequence that touches a framebuffer or its attachments must run with a
//! single context current, and must put the previous context back when it is
//! done. [`ScopedContext`] packages that save/make-current/restore pattern
//! as an RAII guard, so the restore happens on every exit path, including
//! unwinding.
//!
//! The registry itself is process-wide state with init-on-first-use and no
//! teardown ordering guarantees beyond process exit.

use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// An opaque GPU context identity.
///
/// Contexts are compared by identity; two handles are the same context iff
/// they share the same `Arc`.
#[derive(Debug)]
pub struct GpuContext {
    id: u64,
}

impl GpuContext {
    fn new() -> Arc<Self> {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Arc::new(Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
        })
    }

    /// Unique context id, for logging.
    pub fn id(&self) -> u64 {
        self.id
    }
}

thread_local! {
    static CURRENT: RefCell<Option<Arc<GpuContext>>> = const { RefCell::new(None) };
}

/// The context currently bound on this thread, if any.
pub fn current() -> Option<Arc<GpuContext>> {
    CURRENT.with(|current| current.borrow().clone())
}

/// Bind `context` on this thread, replacing whatever was current.
///
/// Prefer [`ScopedContext`] for anything that needs the previous context
/// restored afterwards.
pub fn make_current(context: Option<Arc<GpuContext>>) {
    CURRENT.with(|current| *current.borrow_mut() = context);
}

/// The process-wide shared context, created on first use.
///
/// Draw targets adopt this as their master context so attachment textures
/// are visible to every pass that consumes them.
pub fn shared() -> Arc<GpuContext> {
    static SHARED: OnceLock<Arc<GpuContext>> = OnceLock::new();
    SHARED.get_or_init(GpuContext::new).clone()
}

/// RAII guard that makes a context current and restores the previously
/// current context when dropped.
///
/// ```ignore
/// let _ctx = ScopedContext::make_current(draw_target_context);
/// // ... framebuffer operations ...
/// // previous context restored here, even on panic
/// ```
#[derive(Debug)]
pub struct ScopedContext {
    previous: Option<Arc<GpuContext>>,
}

impl ScopedContext {
    /// Save the current context and make `context` current.
    pub fn make_current(context: Arc<GpuContext>) -> Self {
        let previous = current();
        log::trace!(
            "context {} made current (was {:?})",
            context.id(),
            previous.as_ref().map(|c| c.id())
        );
        make_current(Some(context));
        Self { previous }
    }
}

impl Drop for ScopedContext {
    fn drop(&mut self) {
        make_current(self.previous.take());
    }
}
