pub mod artifact;
pub mod common;
pub mod images;
pub mod request;

pub use artifact::*;
pub use common::*;
pub use images::*;
pub use request::*;
