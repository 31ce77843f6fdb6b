pub mod entity;
pub mod error;
pub mod port;
pub mod service;

pub use entity::*;
pub use error::*;
pub use port::*;
pub use service::*;
