pub mod credentials;

pub use credentials::{ProxySettings, SecretString};
