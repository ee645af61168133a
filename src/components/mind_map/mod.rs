mod component;
mod geometry;
mod render;
mod state;
mod types;

pub use component::MindMapCanvas;
pub use state::{MindMapState, ROOT_LABEL};
pub use types::{Notice, NoticeLevel};
