pub mod config;
pub mod logging;
pub mod scribe;

pub mod extract;
pub mod harvest;
pub mod media;
pub mod retry;
pub mod scheduler;
pub mod storage;
pub mod transport;
pub mod url_model;
