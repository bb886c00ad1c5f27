pub mod aggregate;
pub mod feed;
pub mod repair;
pub mod validate;
