pub mod shared_days;
pub mod summary;
pub mod timeline;
