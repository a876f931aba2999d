#![warn(clippy::pedantic)]

//! Single-threaded, epoll-based event multiplexer and a generic event bus.
//!
//! [`Reactor`] owns the process's one epoll instance and every timer it
//! needs (refresh, key-repeat, cursor blink), plus a self-pipe for signal
//! delivery. [`Bus`] is a separate, synchronous typed publish/subscribe
//! registry that other components (the screen, the terminal engine) use to
//! announce state changes without depending on each other directly.

mod bus;
mod reactor;

pub use bus::Bus;
pub use reactor::{Error, Event, Reactor};
