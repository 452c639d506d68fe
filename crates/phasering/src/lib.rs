pub mod config;
pub mod connector;
pub mod diagram;
pub mod geometry;
pub mod highlight;
pub mod layout;
pub mod macros;
pub mod render;
pub mod schedule;
pub mod svg;
pub mod theme;

pub use diagram::{Diagram, DiagramError, DiagramOptions};
pub use geometry::{Point, Size};
pub use svg::SvgSurface;
