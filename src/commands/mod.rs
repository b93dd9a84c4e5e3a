pub mod check;
pub mod discover;
