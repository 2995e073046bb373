//! Carousel children and slide index assignment

use smallvec::SmallVec;

use crate::control::Control;
use crate::slide::Slide;

/// Slide indices for a child list, `None` for children that are not slides
pub type SlideIndices = SmallVec<[Option<usize>; 8]>;

/// A direct child of a carousel
#[derive(Clone, Debug)]
pub enum Child<R> {
    /// Takes the next slide index
    Slide(Slide<R>),
    /// Render-prop child, always rendered
    Control(Control<R>),
    /// Any other content, passed through untouched
    Node(R),
}

impl<R> Child<R> {
    pub fn is_slide(&self) -> bool {
        matches!(self, Child::Slide(_))
    }
}

impl<R> From<Slide<R>> for Child<R> {
    fn from(slide: Slide<R>) -> Self {
        Child::Slide(slide)
    }
}

impl<R> From<Control<R>> for Child<R> {
    fn from(control: Control<R>) -> Self {
        Child::Control(control)
    }
}

/// Assign sequential indices to slide children
///
/// Each slide gets its ordinal position among slides only; other children get
/// `None` and do not consume an index. This is a pure scan, so reordering the
/// children reorders the indices.
pub fn assign_slide_indices<R>(children: &[Child<R>]) -> SlideIndices {
    let mut next = 0;
    children
        .iter()
        .map(|child| {
            child.is_slide().then(|| {
                let index = next;
                next += 1;
                index
            })
        })
        .collect()
}

/// Number of slide children
pub fn count_slides<R>(children: &[Child<R>]) -> usize {
    children.iter().filter(|child| child.is_slide()).count()
}
