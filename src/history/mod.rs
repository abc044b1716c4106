pub mod delimited;
pub mod error;
pub mod fetcher;
pub mod markup;
pub mod parser;
