pub mod classifier;
pub mod config;
pub mod history;
pub mod prompt;
pub mod session;
pub mod taxonomy;

pub use classifier::{Classifier, ClassifierConfig, ClassifyError, FailureKind, LlmClassifier};
pub use config::{load_config, validate_config, TaghiveConfig};
pub use history::SessionHistory;
pub use prompt::build_prompt;
pub use session::{split_input, BatchReport, InputEmptyError, LineFailure, SessionRunner};
pub use taxonomy::{InputMode, Taxonomy, TaxonomyError, TaxonomyPreset};
