//! Client behavior against a scripted transport.

mod read;
mod session;
mod write;
