use std::io;
use tracing::{debug, warn};

/// Validates the stdio transport before the MCP session starts.
///
/// Protocol frames travel over stdout, so a terminal on stdout usually means
/// the server was started by hand rather than by an MCP client.
pub fn validate_stdio_transport() -> io::Result<()> {
    if atty::is(atty::Stream::Stdin) {
        debug!("Stdin is a terminal - expecting JSON-RPC frames typed by hand");
    } else {
        debug!("Stdio transport detected - ready for MCP communication");
    }

    if atty::is(atty::Stream::Stdout) {
        warn!("Stdout is a terminal; MCP responses will be printed to the console");
    }

    Ok(())
}
