pub mod hashing;
pub mod validation;
