//! Quality labels and the replacement rule for stored candidates.
//!
//! The itag table maps format identifiers to human-readable labels; the
//! priority table orders those labels per media kind. The arbiter only
//! consults the priority table.

mod arbiter;
mod table;

pub use arbiter::should_replace;
pub use table::{priority, quality_of, UNKNOWN_QUALITY};
