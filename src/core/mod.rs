pub mod checker;
pub mod crackme;
pub mod error;
pub mod exercises;
pub mod input;
pub mod solve;
