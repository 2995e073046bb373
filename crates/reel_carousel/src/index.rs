//! Slide index resolution

/// Resolve a requested slide index against the slide count
///
/// - past the end with `looping` -> first slide
/// - below zero -> last slide (regardless of `looping`)
/// - in range -> unchanged
/// - past the end without `looping` -> `previous`
///
/// With no slides there is nothing to select and `previous` is returned.
pub fn resolve_index(requested: isize, previous: usize, slide_count: usize, looping: bool) -> usize {
    if slide_count == 0 {
        return previous;
    }

    if requested < 0 {
        return slide_count - 1;
    }

    let requested = requested as usize;
    if requested < slide_count {
        requested
    } else if looping {
        0
    } else {
        previous
    }
}
