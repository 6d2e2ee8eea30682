pub mod gate;
pub mod issuance;
