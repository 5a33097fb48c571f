pub mod auth;
pub mod export;
pub mod intake;
pub mod review;
