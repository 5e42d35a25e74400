//! Content records for narrated, multi-language books
//!
//! A book moves through discrete stages, each of which reads and writes plain
//! files so that any stage can be rerun on its own:
//!
//! - **preprocess**: join wrapped lines and insert `<!-- SUBBOOK/CHAPTER/REF -->` markers
//! - **extract**: split the marked book into one text file per chapter
//! - **segment**: split chapters into paragraphs and sentences, assigning IDs,
//!   a book-wide sentence index and an audio filename to every sentence
//! - **assemble**: build the table of contents from the native records
//! - **translate** / **audio**: produce target-language records and speech
//!   through the [`Translator`] and [`SpeechSynthesizer`] traits
//! - **validate** / **verify**: check shapes, indices and artifact presence
//!
//! # Example
//!
//! ```rust
//! use echobook_core::{ChapterCoordinates, LanguageCode, SegmentationEngine, SentenceCounter};
//!
//! let engine = SegmentationEngine::english().unwrap();
//! let coords = ChapterCoordinates {
//!     book_code: "BOOKM".to_string(),
//!     subbook: 1,
//!     chapter: 1,
//!     language: LanguageCode::new("en-US").unwrap(),
//! };
//! let mut counter = SentenceCounter::new();
//!
//! let text = "the first chapter\n\nHello world. Second sentence.\n\nThird one here.";
//! let record = engine.process_chapter(text, &coords, &mut counter).unwrap();
//!
//! assert_eq!(record.chapter_title, "The First Chapter");
//! assert_eq!(record.paragraphs.len(), 2);
//! assert_eq!(
//!     record.paragraphs[1].sentences[0].audio_file,
//!     "0000003_BOOKM_S1_C1_P2_S1_en-US.aac"
//! );
//! ```

pub mod audio;
pub mod book;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod extractor;
pub mod language;
pub mod markers;
pub mod model;
pub mod naming;
pub mod pool;
pub mod preprocess;
pub mod segmenter;
pub mod structure;
pub mod text;
pub mod translate;
pub mod validate;
pub mod verify;

pub use audio::{AudioJob, AudioReport, SpeechSynthesizer};
pub use book::{BookRun, BookRunConfig, BookRunReport};
pub use engine::{ChapterCoordinates, ChapterDraft, SegmentationEngine, SentenceCounter};
pub use error::{EchoError, Result, ServiceError};
pub use extractor::{extract_chapters, ChapterExtractor, ChapterUnit, Extraction};
pub use language::LanguageCode;
pub use markers::{parse_marker, Marker, MarkerKind};
pub use model::{ChapterRecord, ParagraphRecord, SentenceRecord, StructureRecord};
pub use pool::WorkerPool;
pub use segmenter::{RuleSegmenter, SegmenterConfig, SentenceSegmenter};
pub use structure::{assemble_structure, BookMetadata};
pub use translate::{translate_chapter, TranslationJob, TranslationReport, Translator};
pub use validate::{validate_book, ValidationReport};
pub use verify::{verify_book, VerificationReport};
