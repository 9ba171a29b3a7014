//! Layout algorithms for marlin diagrams.
//!
//! Baseline: `mxgraph`'s layout package (`mxCircleLayout`, `mxStackLayout`,
//! `mxPartitionLayout`, `mxParallelEdgeLayout`, `mxFastOrganicLayout`). Each layout mutates
//! cell geometries through the model crate's transactional engine.

pub use marlin_model as model;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod base;
pub mod circle;
pub mod composite;
pub mod fast_organic;
pub mod parallel_edge;
pub mod partition;
pub mod stack;

pub use base::Layout;
pub use circle::CircleLayout;
pub use composite::CompositeLayout;
pub use fast_organic::{CancelHandle, FastOrganicLayout};
pub use parallel_edge::ParallelEdgeLayout;
pub use partition::PartitionLayout;
pub use stack::StackLayout;
