#![forbid(unsafe_code)]

pub mod config;
pub mod loader;
pub mod playlist;
pub mod validate;

pub use config::ValidatorConfig;
pub use loader::{
    FileLoader, Fetched, HttpLoader, LoadError, Locator, LocatorError, PlaylistLoader,
    SourceLoader,
};
pub use playlist::{
    BuildError, ClassificationMode, MasterPlaylist, NodeKind, Playlist, PlaylistNode, TreeBuilder,
};
pub use validate::{Finding, NodeReport, Severity, Summary, ValidationReport, Validator};
