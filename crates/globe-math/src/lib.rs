//! f64 model-space vectors shared by the globe crates.

mod model_position;

pub use model_position::ModelPosition;
