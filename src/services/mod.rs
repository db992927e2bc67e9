pub mod cart;
pub mod checkout;
pub mod location;
pub mod pricing;
