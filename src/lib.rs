pub mod config;
pub mod dashboard;
pub mod fetch;
pub mod history;
pub mod poller;
pub mod process;
