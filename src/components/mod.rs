pub mod graph_canvas;
pub mod history;
