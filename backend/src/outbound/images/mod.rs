//! Image host adapters.

mod cloudinary;
mod memory;

pub use cloudinary::{CloudinaryCredentials, CloudinaryImageStore};
pub use memory::InMemoryImageStore;
