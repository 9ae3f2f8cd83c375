// Constants for the interpreter

/// Maximum number of nested method activations
pub const DEFAULT_MAX_CALL_DEPTH: usize = 500;

/// Snapshot history limit (256 MB)
pub const DEFAULT_SNAPSHOT_LIMIT: usize = 256 * 1024 * 1024;

/// Name of the entry routine
pub const ENTRY_METHOD: &str = "start";

/// Qualifier of top-level declarations
pub const UNIVERSAL_PREFIX: &str = "universal";

/// Suffix of the slot holding a method's last return value
pub const RETURN_VALUE: &str = "returnValue";

/// Declaration depth of variables that are never swept by block exit
pub const PERMANENT_DEPTH: i64 = -1;

/// Words that may not be used as variable names
pub const KEYWORDS: &[&str] = &[
    "program", "command", "start", "gives", "give", "nothing", "output", "outputNL", "if",
    "else", "while", "for", "do", "break", "true", "false", "universal", RETURN_VALUE,
];
