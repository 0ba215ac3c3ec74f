pub mod cli;
pub mod clients;
pub mod domain;
pub mod infra;
pub mod tools;
