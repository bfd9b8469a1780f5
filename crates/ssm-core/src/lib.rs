//! Core library for ssm (Simple SSH Manager)
//!
//! Turns a short host token such as `web` or `admin@db` into an address the
//! ssh client can connect to, by trying it as a literal address, as a name,
//! and then with each configured candidate domain appended.
//!
//! Settings are layered: built-in defaults, then the first config file found
//! (user-scoped before system-wide), then command-line overrides. The
//! resulting [`config::Settings`] value is passed explicitly to the resolver
//! and the session builder; there is no global config state.

pub mod config;
pub mod home;
pub mod logging;
pub mod resolver;
pub mod session;

pub use config::{ConfigError, ConfigOverrides, ConfigPaths, Settings, SettingsDocument};
pub use resolver::{resolve, HostLookup, ResolveError, SystemLookup, TimeoutLookup};
pub use session::{SessionCommand, SessionError, SessionRequest};
