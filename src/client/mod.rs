pub mod image_client;
pub mod traits;

#[cfg(test)]
pub(crate) mod scripted;

pub use image_client::HttpImageBackend;
pub use traits::ImageBackend;
