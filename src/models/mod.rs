pub mod ingredient;
pub mod recipe;
pub mod user;

pub use ingredient::*;
pub use recipe::*;
pub use user::*;
