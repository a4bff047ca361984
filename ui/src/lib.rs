pub mod static_assets;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The configured static assets directory does not exist
    ///
    /// The app refuses to boot rather than serving 404s for the frontend.
    #[error("static assets directory not found: {0}")]
    MissingDirectory(std::path::PathBuf),
}
