pub mod account_reader;
pub mod request_reader;
pub mod response_writer;
