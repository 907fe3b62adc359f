pub mod appointment;
pub mod client;
pub mod schedule;
pub mod service;
pub mod store;
pub mod stylist;
