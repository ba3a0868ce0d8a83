pub mod bundle;
pub mod candidate;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod logging;
pub mod parsers;
pub mod placeholder;
pub mod registry;
pub mod resolver;
pub mod schema;

pub use bundle::DatasetBundle;
pub use candidate::{Candidate, CandidateKind};
pub use config::EngineConfig;
pub use context::{ResolutionContext, SharedContext};
pub use document::DocumentSnapshot;
pub use error::{BundleError, SchemaError};
pub use resolver::Found;
