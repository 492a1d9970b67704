// Adapters layer: concrete implementations of the domain ports.

pub mod cloudinary;
pub mod http;
pub mod sheet;
pub mod storage;
