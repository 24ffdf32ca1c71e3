pub mod auth;
pub mod common;
pub mod downloader;
pub mod parser;
pub mod pipeline;
pub mod site;
pub mod storage;

