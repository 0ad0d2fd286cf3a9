mod component;
mod render;
mod state;

pub use component::GraphCanvas;
pub use render::CanvasSurface;
