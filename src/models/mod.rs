pub mod offday;
pub mod viewer;
