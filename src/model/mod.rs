pub mod percentage;
pub mod token;
pub mod wad;

pub use percentage::Percentage;
pub use token::Token;
