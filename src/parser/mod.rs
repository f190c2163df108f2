pub mod record;
pub mod source;

pub use record::*;
pub use source::*;
