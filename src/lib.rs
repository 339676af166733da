// Library for tests and the watch binary to access modules

pub mod broadcast;
pub mod client;
pub mod collector;
pub mod config;
pub mod error;
pub mod models;
pub mod registry;
pub mod routes;
pub mod sampler;
pub mod version;
