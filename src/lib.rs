//! Deploy in-memory project files to CodeSandbox.
//!
//! ```no_run
//! use codesandbox_deploy::sandbox::{deploy_to_codesandbox, FileMapping, SandboxFile};
//!
//! # async fn run() {
//! let mut files = FileMapping::new();
//! files.insert("index.js".into(), SandboxFile::text("console.log('hi')"));
//!
//! let result = deploy_to_codesandbox(&files, None).await;
//! match result.preview_url() {
//!     Some(url) => println!("Preview: {url}"),
//!     None => eprintln!("{}", result.error_message().unwrap_or_default()),
//! }
//! # }
//! ```

pub mod config;
pub mod files;
pub mod sandbox;

pub use config::DeployConfig;
pub use sandbox::{
    deploy_to_codesandbox, deploy_with_config, CodeSandboxClient, DeployError, Deployment,
    DeploymentResult, FileMapping, SandboxDeployer, SandboxFile,
};
