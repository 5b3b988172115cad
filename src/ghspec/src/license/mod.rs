//! License templates: the registry of known licenses, a fetch cache,
//! author rendering and verification of repository license files.

mod cache;
mod error;
mod registry;
mod render;
mod verify;

pub use cache::{content_checksum, LicenseCache};
pub use error::{LicenseError, RegistryError};
pub use registry::{aliases, lookup, resolve, LicenseSpec, Registry};
pub use render::{
    create, has_author_placeholders, render, AuthorInfo, FULLNAME_PLACEHOLDER, YEAR_PLACEHOLDER,
};
pub use verify::{decode_content, missing_license, verify};
