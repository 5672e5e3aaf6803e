pub mod build;
pub mod cli;
pub mod config;
pub mod contract;
pub mod gitops;
pub mod load_config;
pub mod overlay;
pub mod publish;
