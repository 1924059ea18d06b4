mod locator;

pub use locator::*;
