//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the immutable
//! configuration and the session broker shared by every request.

use crate::config::Config;
use interpreter_core::SessionBroker;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub broker: Arc<SessionBroker>,
    pub config: Arc<Config>,
}
