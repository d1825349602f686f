//! Type-dependency constraint solver for the solfuzz program generator.
//!
//! The IR layer describes which program points must share a type (hard
//! edges) and which may differ by an implicit conversion (weak edges). This
//! crate classifies the resulting DAG into real and nominal heads, enumerates
//! head-type combinations, propagates concrete types to every node, and
//! verifies the result before it is handed to lowering.

pub mod config;
pub mod conversion;
pub mod dag;
pub mod dot;
pub mod error;
pub mod node;
pub mod type_dag;

pub use config::SolverConfig;
pub use conversion::{narrow_legal, widen_legal};
pub use dag::{DependencyDag, EdgeRank};
pub use error::SolverError;
pub use node::DependencyNode;
pub use type_dag::{Direction, HeadAssignment, HeadCandidates, HeadCombinations, TypeDependencyDag};
