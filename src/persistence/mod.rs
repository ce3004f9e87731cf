//! JSON codec for routines and the directory of saved routines.

mod codec;
mod document;
mod store;

pub use codec::{decode, decode_with_log, encode, encode_pretty};
pub use store::{RoutineStore, DEFAULT_ROUTINES_DIR};
