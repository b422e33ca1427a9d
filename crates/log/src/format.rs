//! Format utilities (time)

use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};

/// Timer that writes a system timestamp or nothing.
///
/// Switching `with_timer`/`without_time` would change the layer type per
/// branch; a single timer type keeps the builder arms uniform.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Timer {
    enabled: bool,
}

impl FormatTime for Timer {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        if self.enabled {
            SystemTime.format_time(w)
        } else {
            Ok(())
        }
    }
}

pub(crate) const fn make_timer(enabled: bool) -> Timer {
    Timer { enabled }
}
