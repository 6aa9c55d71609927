//! I2C bus abstractions
//!
//! This module defines the message type that makes up a bus transaction
//! and the trait that all bus adapters must implement.

mod message;
mod traits;

pub use message::{Message, MsgFlags};
pub use traits::*;
