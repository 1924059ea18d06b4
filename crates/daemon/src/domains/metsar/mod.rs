mod sensor;
mod synthesizer;

pub use sensor::*;
pub use synthesizer::*;
