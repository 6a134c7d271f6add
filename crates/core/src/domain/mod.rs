pub mod deal;
pub mod location;
pub mod rent;
