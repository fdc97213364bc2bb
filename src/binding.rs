//! # Binding Hooks
//!
//! Binding mode is owned by the radio link, not by the BLE peripheral. The
//! peripheral only toggles and queries it through `BindingHooks`.

use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Hooks into the link's binding state
#[cfg_attr(test, mockall::automock)]
pub trait BindingHooks: Send + Sync {
    fn enter_binding_mode(&self);

    fn exit_binding_mode(&self);

    fn is_binding_active(&self) -> bool;
}

/// Standalone binding flag for hosts without a radio link
#[derive(Debug, Default)]
pub struct BindingFlag {
    active: AtomicBool,
}

impl BindingFlag {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BindingHooks for BindingFlag {
    fn enter_binding_mode(&self) {
        if !self.active.swap(true, Ordering::SeqCst) {
            info!("Entered binding mode");
        }
    }

    fn exit_binding_mode(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            info!("Exited binding mode");
        }
    }

    fn is_binding_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}
