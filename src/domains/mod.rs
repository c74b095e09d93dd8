pub mod envelope;
pub mod response;
