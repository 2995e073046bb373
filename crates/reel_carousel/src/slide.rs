//! Slide - content shown only while its index is active
//!
//! ```ignore
//! // Static content
//! slide("Welcome")
//!
//! // Wrapped in a container
//! slide("Welcome").wrap(|inner| format!("[ {inner} ]"))
//!
//! // Built on every render
//! Slide::with(|| expensive_panel())
//! ```

use std::sync::Arc;

use crate::state::CarouselState;

/// Wraps rendered slide content in a container
pub type WrapFn<R> = Arc<dyn Fn(R) -> R + Send + Sync>;

/// Builds slide content on demand
pub type ContentFn<R> = Arc<dyn Fn() -> R + Send + Sync>;

#[derive(Clone)]
enum SlideContent<R> {
    Static(R),
    Lazy(ContentFn<R>),
}

/// A carousel slide
///
/// Slides do not know their index; the carousel assigns one on every render
/// from the slide's position among its slide children.
#[derive(Clone)]
pub struct Slide<R> {
    content: SlideContent<R>,
    wrapper: Option<WrapFn<R>>,
}

impl<R> Slide<R> {
    /// A slide showing `content`
    pub fn new(content: R) -> Self {
        Self {
            content: SlideContent::Static(content),
            wrapper: None,
        }
    }

    /// A slide whose content is built each time it renders
    pub fn with<F>(build: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
    {
        Self {
            content: SlideContent::Lazy(Arc::new(build)),
            wrapper: None,
        }
    }

    /// Wrap the content in a container when rendered
    pub fn wrap<F>(mut self, wrapper: F) -> Self
    where
        F: Fn(R) -> R + Send + Sync + 'static,
    {
        self.wrapper = Some(Arc::new(wrapper));
        self
    }

    /// Whether a slide at `index` is visible in `state`
    pub fn is_visible(index: usize, state: &CarouselState) -> bool {
        state.is_active(index)
    }
}

impl<R: Clone> Slide<R> {
    /// Render the slide at `index`, or nothing if another slide is active
    pub fn render(&self, index: usize, state: &CarouselState) -> Option<R> {
        if !Self::is_visible(index, state) {
            return None;
        }

        let content = match &self.content {
            SlideContent::Static(value) => value.clone(),
            SlideContent::Lazy(build) => build(),
        };

        Some(match &self.wrapper {
            Some(wrap) => wrap(content),
            None => content,
        })
    }
}

impl<R> std::fmt::Debug for Slide<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let content = match self.content {
            SlideContent::Static(_) => "static",
            SlideContent::Lazy(_) => "lazy",
        };
        f.debug_struct("Slide")
            .field("content", &content)
            .field("wrapped", &self.wrapper.is_some())
            .finish()
    }
}

/// Create a slide showing `content`
pub fn slide<R>(content: impl Into<R>) -> Slide<R> {
    Slide::new(content.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CarouselConfig;

    fn state_at(active: usize) -> CarouselState {
        let mut state = CarouselState::new(3, &CarouselConfig::default());
        state.active_slide_index = active;
        state
    }

    #[test]
    fn test_renders_only_when_active() {
        let slide: Slide<String> = slide("foo");
        assert_eq!(slide.render(1, &state_at(1)), Some("foo".to_string()));
        assert_eq!(slide.render(1, &state_at(0)), None);
        assert_eq!(slide.render(1, &state_at(2)), None);
    }

    #[test]
    fn test_wrapped_content() {
        let slide = Slide::new("bar".to_string()).wrap(|inner| format!("<div>{inner}</div>"));
        assert_eq!(
            slide.render(0, &state_at(0)),
            Some("<div>bar</div>".to_string())
        );
    }

    #[test]
    fn test_lazy_content() {
        let slide = Slide::with(|| vec![1, 2, 3]);
        assert_eq!(slide.render(2, &state_at(2)), Some(vec![1, 2, 3]));
        assert_eq!(slide.render(2, &state_at(0)), None);
    }
}
