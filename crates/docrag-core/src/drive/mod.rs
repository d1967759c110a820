//! Google Drive metadata manifest, filtering and file sync.

pub mod client;
pub mod credentials;
pub mod filter;
pub mod manifest;

pub use client::DriveClient;
pub use credentials::{
    AnyCredentials, CredentialProvider, Credentials, StaticTokenProvider, TokenFileProvider,
};
pub use filter::DriveFilter;
pub use manifest::{DriveFileMetadata, load_manifest, write_manifest};
