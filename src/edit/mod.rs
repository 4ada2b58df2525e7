pub mod codec;
pub mod level_io;
pub mod session;
