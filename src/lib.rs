pub mod aggregate;
pub mod args;
pub mod balance;
pub mod cli;
pub mod command;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod store;
pub mod terminal;
