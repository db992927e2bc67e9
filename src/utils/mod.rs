pub mod geo;
pub mod session;
