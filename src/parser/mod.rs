pub mod decoder;
pub mod format;
pub mod main;
pub mod stream;

pub use decoder::*;
pub use format::*;
pub use main::*;
pub use stream::*;
