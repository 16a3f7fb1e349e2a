//! One-way bootstrap importer: reconciles an externally authored content
//! snapshot into the resource tables under an upsert-with-soft-delete policy.

pub mod meta;
pub mod rows;
pub mod run;
pub mod slug;
pub mod snapshot;
pub mod sync;
