pub mod client;
pub mod clients;
pub mod utils;
