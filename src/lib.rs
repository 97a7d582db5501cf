pub mod cli;
pub mod config;
pub mod deployer;
pub mod discovery;
pub mod payload;
pub mod response;
pub mod transport;
pub mod utils;
