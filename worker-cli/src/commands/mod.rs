pub mod claims;
pub mod submit;
pub mod sweep;
