use serde::Deserialize;

/// Configuration options for the Rango service, loaded from `config/*.yaml`
/// and `APP_*` environment variables.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind to.
    pub address: String,
    /// Port to listen on.
    pub port: u16,
    /// Path of the SQLite database file.
    pub database_url: String,
    /// Signing key for the session, identity and flash cookies (64+ bytes).
    pub secret: String,
    /// Directory holding the Tera templates.
    pub templates_dir: String,
    /// Directory where uploaded profile pictures are stored and served from.
    pub media_root: String,
    /// Directory with static assets.
    pub assets_dir: String,
}
