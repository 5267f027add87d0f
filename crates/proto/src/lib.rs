// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol and floor arithmetic shared by every elevator process.
//!
//! This crate is the one piece of the system every other crate depends on:
//! the framed-TCP codec, the `Floor` type and its string grammar, and the
//! [`Message`] enum the dispatcher, cars and clients exchange.

pub mod error;
pub mod floor;
pub mod framing;
pub mod message;

pub use error::ProtoError;
pub use floor::Floor;
pub use message::{Message, Status};
