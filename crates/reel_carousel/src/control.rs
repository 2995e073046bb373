//! Control - hands the carousel context to caller-rendered UI
//!
//! A control has no state of its own. Whatever its render function returns is
//! rendered in its place:
//!
//! ```ignore
//! Control::new(|ctx: &CarouselContext| {
//!     button("next").on_click({
//!         let handle = ctx.handle().clone();
//!         move |_| handle.next()
//!     })
//! })
//! ```

use std::sync::Arc;

use crate::state::CarouselContext;

/// Renders a control from the carousel context
pub type ControlFn<R> = Arc<dyn Fn(&CarouselContext) -> R + Send + Sync>;

/// A render-prop child receiving the full carousel context
#[derive(Clone)]
pub struct Control<R> {
    render: ControlFn<R>,
}

impl<R> Control<R> {
    pub fn new<F>(render: F) -> Self
    where
        F: Fn(&CarouselContext) -> R + Send + Sync + 'static,
    {
        Self {
            render: Arc::new(render),
        }
    }

    /// Forward the context to the render function
    pub fn render(&self, ctx: &CarouselContext) -> R {
        (self.render)(ctx)
    }
}

impl<R> std::fmt::Debug for Control<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Control").finish_non_exhaustive()
    }
}

/// Create a control from a render function
pub fn control<R, F>(render: F) -> Control<R>
where
    F: Fn(&CarouselContext) -> R + Send + Sync + 'static,
{
    Control::new(render)
}
