pub mod error;
pub mod net;
pub mod peer;
pub mod proto;
pub mod session;

pub use error::{Result, RssiError};

#[cfg(test)]
mod test;
