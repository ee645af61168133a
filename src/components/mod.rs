pub mod editor;
pub mod mind_map;
pub mod notices;
pub mod properties;
pub mod toolbar;
