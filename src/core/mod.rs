pub mod assertions;
pub mod client;
pub mod context;
pub mod data_generator;
pub mod engine;
pub mod report;
pub mod runner;
pub mod suite;

pub use crate::domain::ports::{PlayerApi, Storage};
pub use crate::utils::error::Result;
