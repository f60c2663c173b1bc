//! Shared external HTTP plumbing.

pub mod client;

pub use client::HTTP_CLIENT;
