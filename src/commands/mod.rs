pub mod extract;
pub mod keys;
