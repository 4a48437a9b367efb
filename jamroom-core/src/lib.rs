//! Building blocks shared by the jamroom registry and server: ids, the
//! playback checkpoint, track references, and client sync rules.

mod config;
mod playback;
mod sync;
mod track;
mod util;

pub use config::*;
pub use playback::*;
pub use sync::*;
pub use track::*;
pub use util::*;
