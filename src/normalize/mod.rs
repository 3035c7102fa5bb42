//! Record normalization core.
//!
//! Pure, stateless transformations from a `RawRecord` to either a
//! `NormalizedRecord` or a `RejectedRecord`. No I/O happens here.
//!
//! Design goals:
//! - **Total**: every record yields exactly one outcome, a bad record never
//!   aborts the batch
//! - **No silent defaults**: unknown ownership is a rejection, not a guess
//! - **Parameterized**: envelope, digit widths, markers and correction
//!   strategies all come from `config::Settings`

pub mod bounds;
pub mod classify;
pub mod pipeline;
pub mod reconcile;
pub mod status;
pub mod text;
pub mod token;

pub use bounds::*;
pub use classify::*;
pub use pipeline::*;
pub use reconcile::*;
pub use status::*;
pub use token::*;
