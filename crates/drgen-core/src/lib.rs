pub mod commit;
pub mod generate;
pub mod hash;
pub mod layout;
pub mod list;
pub mod manifest;
pub mod naming;
pub mod record;
pub mod render;
pub mod verify;

// Convenience re-exports
pub use commit::{
    commit, CommitError, CommitReport, CommitResult, FileOps, OutputSet, Phase, RollbackAction,
    RollbackFailure, StdFileOps, Transaction,
};
pub use generate::{generate_decision_record_files, render_output_set, GenerateError};
pub use hash::{byte_len, sha256_hex, ContentDigest};
pub use list::{
    list_decisions, render_list_report, ListError, ListOptions, ListedDecision, ReportOptions,
};
pub use manifest::{
    parse_manifest, ErrorClass, ErrorCode, FileMeta, Manifest, ManifestError, Signature,
};
pub use naming::{decision_folder_name, find_available_dir, NamingError};
pub use record::{DecisionRecord, RecordError};
pub use verify::{verify_dir, FileCheck, FileStatus, VerifyReport};
