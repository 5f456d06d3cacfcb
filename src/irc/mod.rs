//! IRC client transport.

pub mod codec;
pub mod connection;
pub mod events;
pub mod message;
pub mod outgoing;
pub mod session;

pub use outgoing::Outgoing;
pub use session::{run_session, SessionSettings};
