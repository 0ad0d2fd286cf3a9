//! Node sizing, routing and the layout driver.

pub mod driver;
pub mod engine;
pub mod geometry;
pub mod labels;
pub mod sizing;

pub use driver::{DriverState, Generation, LayoutDriver, RenderEdge, RenderFrame, RenderNode, SelfLoop};
pub use engine::{ForceGraphEngine, LayoutEngine};
pub use geometry::{Point, Rect, Route, route_between};
pub use labels::{LabelSide, orient};
pub use sizing::{SizedGraph, TextBox, TextMeasure};
