//! Diagram cell model and transactional mutation APIs.
//!
//! Baseline: `mxgraph`'s model core (`mxCell`, `mxGraphModel`, `mxGraph`), reworked as a
//! headless arena model. Rendering, stylesheets and interaction live in other crates; the
//! seams they plug into are [`view::View`] and [`view::StyleResolver`].

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cell;
pub mod clipboard;
pub mod error;
pub mod event;
pub mod geometry;
pub mod graph;
pub mod model;
pub mod path;
pub mod style;
pub mod topology;
pub mod view;

pub use cell::{Cell, CellId};
pub use clipboard::Clipboard;
pub use error::{ModelError, Result};
pub use event::{EventSink, GraphEvent};
pub use geometry::{Geometry, Point, Rect};
pub use graph::{Align, Graph};
pub use model::Model;
pub use style::Style;
pub use view::{CellState, CellStyleResolver, StyleResolver, View};
