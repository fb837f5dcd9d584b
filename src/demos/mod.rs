//! Reference DSLs built on the engine.
//!
//! Each constructor registers tokens, rules and actions on a fresh
//! [`Grammar`] the way a host program would. The `dslkit` binary exposes
//! them by name.
//!
//! | Name | Input |
//! |------|-------|
//! | greeting | `from Ana` |
//! | signal | `fft with window hamming`, `gain 6` |
//! | calc | `2 * (3 + 4) - -1` |
//! | query | `from orders select name, total where status = 'open'` |

mod calc;
mod greeting;
mod query;
mod signal;

pub use calc::calc;
pub use greeting::greeting;
pub use query::query;
pub use signal::signal;

use crate::error::Result;
use crate::grammar::Grammar;

/// Names accepted by [`by_name`].
pub const DEMO_NAMES: &[&str] = &["greeting", "signal", "calc", "query"];

/// Build a reference grammar by name.
pub fn by_name(name: &str) -> Option<Result<Grammar>> {
    match name {
        "greeting" => Some(greeting()),
        "signal" => Some(signal()),
        "calc" => Some(calc()),
        "query" => Some(query()),
        _ => None,
    }
}
