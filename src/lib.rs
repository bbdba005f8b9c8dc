pub mod args;
pub mod command;
pub mod config;
pub mod lifecycle;
pub mod process;
pub mod project;
pub mod scan;
pub mod sockets;

pub use error::Error;

mod error;
