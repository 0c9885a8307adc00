pub mod crud;
pub mod datetime;
pub mod membership;
pub mod projection;
pub mod store;
