pub mod aggregate;
pub mod cli;
pub mod controller;
pub mod dataset;
pub mod deriver;
pub mod domain;
pub mod logging;
pub mod model;
pub mod registry;
pub mod report;
pub mod selection;
pub mod ui;

pub use domain::AirscopeError;
