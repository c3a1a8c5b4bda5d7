//! Fixed-dimension 2-D grids and obstacle maps.
//!
//! [`Grid`] is the storage abstraction behind obstacle maps, flow
//! fields, and escape fields: a rectangular array addressed by
//! [`Cell`](drover_core::Cell) with checked access — out-of-range reads
//! return `None`, never wrap. [`ObstacleMap`] layers a movement class
//! and a version stamp on a `Grid<bool>` of blocked cells.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod error;
mod grid;
mod obstacle;

pub use error::GridError;
pub use grid::{Grid, NEIGHBOUR_OFFSETS};
pub use obstacle::ObstacleMap;
