pub mod controller;
pub mod gateway;
pub mod models;
pub mod server;
pub mod store;
