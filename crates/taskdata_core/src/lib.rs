pub mod config;
pub mod error;
pub mod ids;
pub mod logging;
pub mod model;
pub mod report;
pub mod storage;
pub mod task_api;
pub mod text;
pub mod timefmt;
pub mod validation;
