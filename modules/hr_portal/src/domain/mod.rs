pub mod error;
pub mod ports;
pub mod router;
pub mod service;
pub mod session;
