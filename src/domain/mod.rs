//! Domain models and types for Object Tracker.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Object identity** ([`ObjectRef`], [`ObjectType`])
//! - **Retrieved definitions** ([`DdlText`])
//! - **Error types** ([`TrackerError`], [`VcsError`], [`FailureKind`])
//! - **Result type alias** ([`Result`])
//!
//! # Object types
//!
//! Each [`ObjectType`] carries the catalog keyword used to enumerate it and
//! a single-token short name used for the output directory:
//!
//! ```rust
//! use object_tracker::domain::ObjectType;
//!
//! let object_type: ObjectType = "PACKAGE BODY".parse().unwrap();
//! assert_eq!(object_type.short_name(), "PACKAGE_BODY");
//! ```

pub mod errors;
pub mod object;
pub mod object_type;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{FailureKind, TrackerError, VcsError};
pub use object::{DdlText, ObjectRef};
pub use object_type::ObjectType;
pub use result::Result;
