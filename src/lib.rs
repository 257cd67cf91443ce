pub mod chart;
pub mod config;
pub mod countries;
pub mod dataset;
pub mod drilldown;
pub mod error;
pub mod http_client;
pub mod loader;
pub mod normalize;
pub mod pie;
pub mod scale;
pub mod state;
