mod diff;
mod render;

pub use diff::*;
pub use render::*;
