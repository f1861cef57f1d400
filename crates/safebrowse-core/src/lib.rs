pub mod config;
pub mod logging;

pub mod allow_list;
pub mod features;
pub mod model;
pub mod policy;
pub mod scaler;
pub mod service;
pub mod sink;
