// Build-time version from Cargo.toml

/// Package version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name (from Cargo.toml).
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// "hostpulse/0.3.0"; sent as User-Agent by the watch client.
pub fn user_agent() -> String {
    format!("{NAME}/{VERSION}")
}
