#![forbid(unsafe_code)]

pub mod catalog;
pub mod daily;
pub mod error;
pub mod model;
pub mod rating;
pub mod selector;
pub mod time;

pub use catalog::Catalog;
pub use error::Error;
pub use time::Clock;
