pub mod request;
pub mod request_reader;
