pub mod error_location;
pub mod protocol_error;
