pub mod benchmark;
pub mod config;
pub mod cubic;
pub mod name;
