//! Asset loading errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to load model {path:?}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("model {path:?} contains no scene")]
    NoScene { path: PathBuf },
    #[error("asset loader stopped before {path:?} finished")]
    LoaderGone { path: PathBuf },
}
