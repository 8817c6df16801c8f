pub mod format;
pub mod log;
pub mod record;
pub mod track;
pub mod value;

pub use format::*;
pub use log::*;
pub use record::*;
pub use track::*;
pub use value::*;
