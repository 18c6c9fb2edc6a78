mod checkpoint;

pub use checkpoint::*;
