pub mod command;
pub mod method;
pub mod reply;

pub use command::*;
pub use method::*;
pub use reply::*;
