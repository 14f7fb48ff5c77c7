pub mod exchange;
pub mod listing;
