//! Edit scripts: batches of edits described in TOML or JSON.
//!
//! ```toml
//! [meta]
//! name = "rename-foo"
//!
//! [[edits]]
//! kind = "replace"
//! begin = 4
//! end = 7
//! text = "bar"
//! expected = "foo"
//!
//! [[transactions]]
//! name = "wrap-arg"
//!
//! [[transactions.edits]]
//! kind = "wrap"
//! begin = 10
//! end = 11
//! before = "Some("
//! after = ")"
//! ```

pub mod loader;
pub mod runner;
pub mod schema;

pub use loader::{load_from_path, load_from_str, load_json_str, ScriptError};
pub use runner::{run_script, RunError, RunOptions, RunReport};
pub use schema::{
    EditDefinition, EditOperation, EditScript, Metadata, TransactionDefinition, ValidationError,
    ValidationIssue,
};
