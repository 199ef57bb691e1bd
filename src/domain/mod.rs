pub mod errors;
pub mod ports;
pub mod returns;
pub mod session;
