pub mod coordinates;
pub mod menu;
pub mod order;
pub mod quote;
pub mod user;
