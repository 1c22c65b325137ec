//! Build metadata embedded by `build.rs`, shown by `logctl --version`.

/// Short git commit hash, or `unknown` outside a checkout.
pub const GIT_HASH: &str = env!("LOGCTL_GIT_HASH");

/// Build time in seconds since the Unix epoch.
pub const BUILD_TIMESTAMP: &str = env!("LOGCTL_BUILD_TIMESTAMP");

pub const BUILD_PROFILE: &str = env!("LOGCTL_BUILD_PROFILE");

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// `VERSION (GIT_HASH, BUILD_PROFILE)`, usable where a `&'static str` is needed.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("LOGCTL_GIT_HASH"),
    ", ",
    env!("LOGCTL_BUILD_PROFILE"),
    ")"
);

/// Version line including the build time, e.g. `0.1.0 (abc1234, debug, built 1760745600)`.
pub fn version_string() -> String {
    format!("{VERSION} ({GIT_HASH}, {BUILD_PROFILE}, built {BUILD_TIMESTAMP})")
}
