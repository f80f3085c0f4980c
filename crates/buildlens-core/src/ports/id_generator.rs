//! IdGenerator port.
//!
//! `UlidGenerator` takes the timestamp part of every id from a `Clock`, so a
//! `FixedClock` yields ids with a known creation time.

use crate::domain::BuildId;
use crate::ports::Clock;
use ulid::Ulid;

/// Source of build ids.
pub trait IdGenerator: Send + Sync {
    fn generate_build_id(&self) -> BuildId;
}

/// ULID generator taking its timestamp from `C`.
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_build_id(&self) -> BuildId {
        let ulid = Ulid::from_parts(self.clock.now_ms(), rand::random());
        BuildId::from(ulid)
    }
}
