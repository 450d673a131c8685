pub mod error;
pub mod geometry;
pub mod landmarks;
pub mod math;
pub mod mesh;
pub mod operations;
pub mod options;
pub mod template;

pub use error::{HeartBaseError, Result};
