use const_format::concatcp;
use git_version::git_version;

const GIT_VERSION: &str = git_version!(args = ["--always", "--dirty=-modified"], fallback = "unknown");

/// Crate version plus git revision, as printed by the binaries at startup
pub const PIPE_VERSION: &str = concatcp!(env!("CARGO_PKG_VERSION"), " (", GIT_VERSION, ")");
