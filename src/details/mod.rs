pub use ping_error::PingError;
pub use ping_result::PingResult;
pub use ping_session::HaltHandle;
pub(crate) use ping_session::PingSession;
pub use statistics::{PingStatistics, Statistics};

pub(crate) mod icmp;
mod ping_error;
mod ping_result;
mod ping_session;
mod statistics;
