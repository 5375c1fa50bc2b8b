pub mod admin;
pub mod content;
pub mod error;
pub mod health;
pub mod me;

pub use error::AppError;
