// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The seam between the core runtime and whatever transport carries
//! effects out to subscribers and adapters.

use crate::effect::ProjectionEffect;

/// Publishes outbound effects. The runtime crate's concrete implementation
/// wraps a `tokio::sync::mpsc::Sender`; core stays free of any async
/// runtime dependency.
pub trait ProjectionBus: Send + Sync {
    fn publish(&self, effect: ProjectionEffect);
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_support {
    use super::*;
    use parking_lot::Mutex;

    /// An in-memory bus that records every published effect, for assertions
    /// in tests that don't need a real channel.
    #[derive(Default)]
    pub struct RecordingBus {
        effects: Mutex<Vec<ProjectionEffect>>,
    }

    impl RecordingBus {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn published(&self) -> Vec<ProjectionEffect> {
            self.effects.lock().clone()
        }
    }

    impl ProjectionBus for RecordingBus {
        fn publish(&self, effect: ProjectionEffect) {
            self.effects.lock().push(effect);
        }
    }
}
