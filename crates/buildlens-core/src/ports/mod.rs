//! Ports: the seams between report assembly and the outside world.
//!
//! - `Clock` and `IdGenerator` make time and ids replaceable in tests.
//! - `Sink` is the publication contract every destination implements.

pub mod clock;
pub mod id_generator;
pub mod sink;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::sink::Sink;
