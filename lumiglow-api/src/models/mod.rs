mod command;
mod descriptor;
mod lighting;
mod pattern;

pub use command::*;
pub use descriptor::*;
pub use lighting::*;
pub use pattern::*;

/// Red, green and blue channel values.
pub type Rgb = [u8; 3];
