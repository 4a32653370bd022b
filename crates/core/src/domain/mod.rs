pub mod rates;
pub mod summary;
