// Log output for binaries embedding the library. The library itself only emits events.

use anyhow::{anyhow, Result};
use tracing::Level;

/// Install a fmt subscriber at `level`. Fails if a global subscriber is already set.
pub fn init(level: Level) -> Result<()> {
    tracing_subscriber::fmt()
        // filter spans/events below the requested level
        .with_max_level(level)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))
}
