//! Non-blocking PTY allocation and the child-shell spawn dance.
//!
//! [`Pty`] owns one end of a pseudoterminal, buffers writes so callers
//! never block on a full tty, and keeps a read buffer sized like a
//! single chunk off the wire so an [`vtreactor::Reactor`] can drive it
//! from `TtyRead`/`TtyWrite` events.

mod pty;
mod spawn;

pub use pty::{Error, Pty};
pub use spawn::SpawnConfig;
