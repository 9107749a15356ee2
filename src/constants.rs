// src/constants.rs

/// The name of the configuration directory under the system config dir.
pub const APP_DIR_NAME: &str = "stagehand";

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "STAGEHAND_CONFIG_DIR";

/// The name of the file holding the launch profiles (inside the config dir).
pub const ENVIRONMENTS_FILENAME: &str = "environments.toml";

/// A line whose first non-blank character is this marker is a comment.
pub const COMMENT_MARKER: char = '#';

/// A physical line ending with this character continues on the next one.
pub const LINE_CONTINUATION: char = '\\';

/// Token separating a command from its trailing filter stages.
pub const FILTER_PIPE: &str = "|";

/// Token separating a command's own options from raw passthrough arguments.
pub const PASSTHROUGH_SEPARATOR: &str = "--";

/// Opening sequence of a script variable reference (`${name}`).
pub const VAR_OPEN: &str = "${";

/// Closing sequence shared by both reference kinds.
pub const VAR_CLOSE: &str = "}";

/// Upper bound on recursive script-variable expansion passes.
pub const MAX_EXPANSION_DEPTH: u32 = 32;

/// How often a running subprocess is polled for exit and cancellation.
pub const PROCESS_POLL_INTERVAL_MS: u64 = 100;
