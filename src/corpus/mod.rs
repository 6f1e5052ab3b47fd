//! Lab corpus storage and loading.
//!
//! The corpus is the deduplicated, in-memory collection of [`Lab`] records that
//! the ranker indexes. A small sample corpus is compiled into the binary so the
//! ranker can always be exercised, but real corpora are loaded from the
//! artifacts produced by the scraping and summarization scripts.
//!
//! ## Sources
//!
//! - **JSON**: `{version, created_at, labs: [...]}` or a bare array of labs
//! - **Embedded literal**: the `const labs: Lab[] = [...]` array inside a
//!   front-end page
//! - **Analysis blocks**: one `.txt` file of `Professor:` blocks per department
//! - **Text directory**: every `.txt` block file in a directory
//!
//! ## Example
//!
//! ```rust,no_run
//! use lab_matcher::corpus::loader::CorpusLoader;
//!
//! let (corpus, report) = CorpusLoader::new()
//!     .with_source("labfinder/src/app/database/page.tsx")
//!     .with_text_dir("summaries/")
//!     .load();
//!
//! println!("{} labs ({:?})", corpus.len(), report.origin);
//! ```
//!
//! [`Lab`]: crate::core::lab::Lab

pub mod loader;
pub mod store;
