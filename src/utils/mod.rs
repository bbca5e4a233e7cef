pub mod date;
pub mod export;
