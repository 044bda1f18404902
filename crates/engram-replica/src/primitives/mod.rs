//! CRDT primitive library.
//!
//! Five independent convergent types. Every merge satisfies commutativity,
//! associativity, and idempotency — the property suite under
//! `tests/property/` enforces all three for arbitrary states.

pub mod gcounter;
pub mod lww_register;
pub mod max_register;
pub mod mv_register;
pub mod or_set;

pub use gcounter::GCounter;
pub use lww_register::LwwRegister;
pub use max_register::MaxRegister;
pub use mv_register::{MvEntry, MvRegister};
pub use or_set::{AddTag, OrSet};
