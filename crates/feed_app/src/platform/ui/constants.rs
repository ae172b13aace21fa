pub const TITLE: &str = "Repository activity";
pub const LOADING_TEXT: &str = "Loading activity feed...";
pub const EMPTY_TEXT: &str = "No events yet.";
pub const NEVER_SYNCED: &str = "never";
pub const SYNCING_MARK: &str = " (syncing)";
pub const ROW_INDENT: &str = "    ";
