mod decoder;
mod observation;
mod weather;

pub use decoder::{decode, strip_message_type};
pub use observation::*;
pub use weather::phenomenon_text;
