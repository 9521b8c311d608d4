pub mod agent;
pub mod protocol;
pub mod protocol_parser;
