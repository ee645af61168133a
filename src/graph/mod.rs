//! Node/link store, its tree index, undo history and tree layout.

mod history;
pub mod layout;
mod model;
mod store;
mod tree_index;

pub use history::History;
pub use layout::{Direction, layout};
pub use model::{FontSize, Node, NodeStyle, SecondaryLink, Shape};
pub use store::{Graph, ROOT_ID};
pub use tree_index::TreeIndex;
