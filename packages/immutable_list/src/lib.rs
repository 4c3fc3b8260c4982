//! This package provides [`ImmutableList`], a list whose contents are fixed at construction.
//!
//! Cloning the list is cheap because all clones share the same storage. The list dereferences
//! to a slice, so all read-only slice methods are available directly.
//!
//! # Example
//!
//! ```rust
//! use immutable_list::ImmutableList;
//!
//! let names = ImmutableList::of(["width", "height"]);
//! let copy = names.clone();
//!
//! assert_eq!(names.len(), 2);
//! assert_eq!(copy[1], "height");
//! assert!(names.contains(&"width"));
//! ```

mod list;

pub use list::*;
