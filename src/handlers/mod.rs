pub mod auth;
pub mod cart;
pub mod checkout;
pub mod location;
pub mod menu;
pub mod orders;
