//! # CABEL Core
//!
//! Dataset/model registry, path layout and SLURM dispatch for CABEL
//! entity-linking training runs. The submission flow is
//! registry → parameter assembly → dispatch, iterated once per requested
//! (dataset [, model]) combination.
//!
//! ## Quick Start
//!
//! ```rust
//! use cabel_core::{Dataset, JobParams, Layout};
//!
//! let layout = Layout::new("/work/cabel");
//! let params = JobParams::biencoder("EMEA".parse::<Dataset>().unwrap(), &layout);
//!
//! assert_eq!(params.job_name, "bienc-emea");
//! assert_eq!(params.var("EPOCHS"), Some("100"));
//! ```
pub mod dispatch;
pub mod error;
pub mod layout;
pub mod params;
pub mod registry;

// Re-export primary API
pub use dispatch::{Dispatcher, SlurmJob, ensure_log_dir};
pub use error::{CabelError, Result};
pub use layout::{Layout, PathBundle};
pub use params::JobParams;
pub use registry::{Dataset, Model};
