pub mod summary;
pub mod transcript;
