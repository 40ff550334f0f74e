#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod codec;
mod constraint;
mod error;
mod generator;
pub mod global;
mod id;
mod node;
mod sequencer;
#[cfg(feature = "serde")]
mod serde;
mod sync;
mod time;

pub use crate::codec::*;
pub use crate::constraint::*;
pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::node::*;
pub use crate::sequencer::*;
pub use crate::time::*;
