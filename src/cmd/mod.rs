pub mod inject;
pub mod upload;
pub mod validate;
