pub mod health;
pub mod polls;
