pub mod game;
pub mod pick;
pub mod team;

pub use game::*;
pub use pick::*;
pub use team::*;
