pub mod assistant;
pub mod user;

pub use assistant::*;
pub use user::*;
