//! # Selection and Range Utilities
//!
//! Pure functions of a `&Value` snapshot: stepping a point by offset,
//! grapheme or word, building and clamping ranges, and reading the text a
//! range covers. Used by the transform engine, the format toggles and the
//! mention engine alike.

pub mod marks;
pub mod positions;
pub mod range;

pub use marks::{current_marks, marks_at};
pub use positions::{PLACEHOLDER, Unit, point_after, point_before, point_by};
pub use range::{clamp_point, clamp_range, range_between, text_of, unhang};
