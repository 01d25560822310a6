pub mod config;
pub mod data;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod preview;
pub mod render;
pub mod smtp;

pub use error::CertsendError;
pub type Result<T> = std::result::Result<T, CertsendError>;
