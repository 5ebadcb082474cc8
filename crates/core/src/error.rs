use thiserror::Error;

use crate::model::{AppSettingsError, CatalogError, DocumentError, ParseIdError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Settings(#[from] AppSettingsError),
    #[error(transparent)]
    Id(#[from] ParseIdError),
}
