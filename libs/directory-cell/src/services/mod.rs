pub mod directory;
pub mod tokens;
