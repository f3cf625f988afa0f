pub mod config;
pub mod logging;

// Pipeline modules
pub mod asset;
pub mod broker;
pub mod cache;
pub mod channel;
pub mod classifier;
pub mod gateway;
pub mod network;
pub mod registry;
pub mod url_model;
