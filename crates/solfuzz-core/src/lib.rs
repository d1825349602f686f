pub mod error;
pub mod id;
pub mod lattice;
pub mod types;

// Re-export commonly used types
pub use error::CoreError;
pub use id::NodeId;
pub use lattice::{includes, intersection_range, is_equal_range, is_super_range, LatticeValue};
pub use types::{all_elementary_types, all_integer_types, IntWidth, Type, TypeKind};
