pub mod auth;
pub mod error;
pub mod qr;
pub mod response;
