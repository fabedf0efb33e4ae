//! Repositories for data service operations

pub mod user;

pub use user::UserRepository;
