mod dims;
mod native;

pub use dims::*;
pub use native::owned::*;
