//! Rust’s client-side OAuth 2.0 token warden—guard a bearer credential behind single-flight
//! refreshes, replay blocked callers in arrival order, and resolve interactive logins from outside
//! the control flow.
//!
//! The warden never talks to the network itself. It owns the token lifecycle state machine and a
//! queue of guarded calls, and asks a [`delegate::WardenDelegate`] to perform the actual refresh
//! exchange or to surface an interactive login; login outcomes flow back in through
//! [`warden::Warden::authorize`] and [`warden::Warden::abort_authorization`].

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod delegate;
pub mod error;
pub mod obs;
pub mod store;
pub mod warden;
#[cfg(any(test, feature = "test"))] pub mod _preludet;

mod _prelude {
	pub use std::{
		collections::VecDeque,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::{Arc, Weak},
	};

	pub use parking_lot::RwLock;
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};

	pub use crate::error::{AuthError, Result};
}

#[cfg(test)] use color_eyre as _;
