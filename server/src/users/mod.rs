pub mod crud;
pub mod seed;
pub mod store;
