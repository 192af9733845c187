//! # Configuration
//!
//! Layered settings: built-in defaults, then `config/default.toml` and
//! `config/{RUN_ENV}.toml`, then `APP__SECTION__KEY` environment variables.
//! A `.env` file is read first when present. `SERVER_HOST`, `SERVER_PORT`,
//! `DATABASE_URL` and `JWT_SECRET` override everything else.
//!
//! ```rust,ignore
//! use collab_server::config::Settings;
//!
//! let settings = Settings::load()?;
//! let ttl = settings.collab.typing_ttl();
//! ```

mod settings;

pub use settings::*;
