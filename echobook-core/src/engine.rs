//! Sentence segmentation and identity assignment
//!
//! Processing a chapter happens in two passes:
//!
//! 1. [`SegmentationEngine::draft`] is pure. It reads the chapter text, splits
//!    paragraphs and sentences, and resolves the carried-forward reference of
//!    every sentence. Drafts of different chapters are independent and may be
//!    built in parallel.
//! 2. [`ChapterDraft::assign`] walks a draft in reading order and hands out
//!    identifiers, local indices and global indices from a [`SentenceCounter`].
//!    Calling it for each chapter in discovery order is what keeps the global
//!    index set equal to `{1..N}` in document order.

use crate::language::LanguageCode;
use crate::markers::{parse_marker, MarkerKind};
use crate::model::{ChapterRecord, ParagraphRecord, SentenceRecord};
use crate::naming::{audio_filename, AudioCoordinates};
use crate::segmenter::{segment_line, RuleSegmenter, SentenceSegmenter};
use crate::text::title_case;
use log::{debug, warn};
use std::sync::Arc;
use uuid::Uuid;

/// Running global sentence index for one book-language run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceCounter {
    next: u64,
}

impl SentenceCounter {
    /// A counter whose first index is 1
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Take the next index
    pub fn take(&mut self) -> u64 {
        let index = self.next;
        self.next += 1;
        index
    }

    /// The index the next sentence will receive
    pub fn peek(&self) -> u64 {
        self.next
    }

    /// How many indices have been handed out
    pub fn assigned(&self) -> u64 {
        self.next - 1
    }
}

impl Default for SentenceCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a chapter sits in the book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterCoordinates {
    pub book_code: String,
    pub subbook: u32,
    pub chapter: u32,
    pub language: LanguageCode,
}

/// A sentence before identity assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceDraft {
    /// Reference in effect when the sentence was read
    pub reference: String,
    /// Trimmed sentence text
    pub text: String,
}

/// A chapter after segmentation, before identity assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterDraft {
    /// Title-cased chapter title
    pub title: String,
    /// Non-empty paragraphs in reading order
    pub paragraphs: Vec<Vec<SentenceDraft>>,
}

impl ChapterDraft {
    /// Number of sentences the draft will consume from the counter
    pub fn sentence_count(&self) -> usize {
        self.paragraphs.iter().map(Vec::len).sum()
    }

    /// Assign identifiers and indices, consuming one counter value per sentence
    pub fn assign(self, coords: &ChapterCoordinates, counter: &mut SentenceCounter) -> ChapterRecord {
        let mut paragraphs = Vec::with_capacity(self.paragraphs.len());

        for (p, drafts) in self.paragraphs.into_iter().enumerate() {
            let paragraph_index = p as u32 + 1;
            let mut sentences = Vec::with_capacity(drafts.len());

            for (s, draft) in drafts.into_iter().enumerate() {
                let sentence_index = s as u32 + 1;
                let global_sentence_index = counter.take();
                let audio_file = audio_filename(&AudioCoordinates {
                    global_index: global_sentence_index,
                    book_code: &coords.book_code,
                    subbook: coords.subbook,
                    chapter: coords.chapter,
                    paragraph: paragraph_index,
                    sentence: sentence_index,
                    language: &coords.language,
                });
                sentences.push(SentenceRecord {
                    sentence_id: Uuid::new_v4(),
                    sentence_index,
                    global_sentence_index,
                    reference: draft.reference,
                    text: draft.text,
                    audio_file,
                });
            }

            paragraphs.push(ParagraphRecord {
                paragraph_id: Uuid::new_v4(),
                paragraph_index,
                sentences,
            });
        }

        ChapterRecord {
            chapter_id: Uuid::new_v4(),
            language: coords.language.clone(),
            chapter_number: coords.chapter,
            chapter_title: self.title,
            paragraphs,
        }
    }
}

/// Turns chapter text units into content records
#[derive(Clone)]
pub struct SegmentationEngine {
    segmenter: Arc<dyn SentenceSegmenter>,
}

impl std::fmt::Debug for SegmentationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SegmentationEngine").finish_non_exhaustive()
    }
}

impl SegmentationEngine {
    /// Engine over any sentence segmenter
    pub fn new(segmenter: Arc<dyn SentenceSegmenter>) -> Self {
        Self { segmenter }
    }

    /// Engine over the embedded English rules
    pub fn english() -> crate::Result<Self> {
        Ok(Self::new(Arc::new(RuleSegmenter::english()?)))
    }

    /// First pass: title, paragraphs, sentences and references.
    ///
    /// The first line is the title even when it is blank, in which case the
    /// body is kept under an empty title. Returns `None` for blank text.
    pub fn draft(&self, text: &str) -> Option<ChapterDraft> {
        if text.trim().is_empty() {
            return None;
        }
        let mut lines = text.lines();
        let title = title_case(lines.next()?.trim());

        let mut paragraphs = Vec::new();
        let mut current = Vec::new();
        let mut reference = String::new();

        for line in lines {
            let line = line.trim();
            if line.is_empty() {
                // A blank line ends the paragraph; empty ones are dropped
                if !current.is_empty() {
                    paragraphs.push(std::mem::take(&mut current));
                }
                continue;
            }

            // Only references are consumed; other marker lines are body text
            match parse_marker(line) {
                Some(marker) if marker.kind == MarkerKind::Reference => {
                    debug!("reference -> {}", marker.value);
                    reference = marker.value;
                    continue;
                }
                Some(marker) => debug!(
                    "{} marker inside chapter '{}' segmented as text",
                    marker.kind.keyword(),
                    title
                ),
                None => {}
            }

            for sentence in segment_line(self.segmenter.as_ref(), line) {
                current.push(SentenceDraft {
                    reference: reference.clone(),
                    text: sentence,
                });
            }
        }
        if !current.is_empty() {
            paragraphs.push(current);
        }

        Some(ChapterDraft { title, paragraphs })
    }

    /// Both passes for one chapter.
    ///
    /// Empty text yields `None` without touching the counter.
    pub fn process_chapter(
        &self,
        text: &str,
        coords: &ChapterCoordinates,
        counter: &mut SentenceCounter,
    ) -> Option<ChapterRecord> {
        let Some(draft) = self.draft(text) else {
            warn!(
                "Skipping empty chapter {} of subbook {}",
                coords.chapter, coords.subbook
            );
            return None;
        };
        Some(draft.assign(coords, counter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(chapter: u32) -> ChapterCoordinates {
        ChapterCoordinates {
            book_code: "BOOKM".to_string(),
            subbook: 1,
            chapter,
            language: LanguageCode::new("en-US").unwrap(),
        }
    }

    fn engine() -> SegmentationEngine {
        SegmentationEngine::english().unwrap()
    }

    fn references(record: &ChapterRecord) -> Vec<(&str, &str)> {
        record
            .sentences()
            .map(|s| (s.text.as_str(), s.reference.as_str()))
            .collect()
    }

    #[test]
    fn test_counter_starts_at_one() {
        let mut counter = SentenceCounter::new();
        assert_eq!(counter.assigned(), 0);
        assert_eq!(counter.take(), 1);
        assert_eq!(counter.take(), 2);
        assert_eq!(counter.peek(), 3);
        assert_eq!(counter.assigned(), 2);
    }

    #[test]
    fn test_two_paragraph_chapter() {
        let mut counter = SentenceCounter::new();
        let text = "the golden bird\n\nHello world. Second sentence.\n\nThird one here.";
        let record = engine()
            .process_chapter(text, &coords(1), &mut counter)
            .unwrap();

        assert_eq!(record.chapter_title, "The Golden Bird");
        assert_eq!(record.chapter_number, 1);
        assert_eq!(record.paragraphs.len(), 2);
        assert_eq!(record.paragraphs[0].paragraph_index, 1);
        assert_eq!(record.paragraphs[1].paragraph_index, 2);

        let globals: Vec<u64> = record.sentences().map(|s| s.global_sentence_index).collect();
        assert_eq!(globals, vec![1, 2, 3]);
        let locals: Vec<u32> = record.sentences().map(|s| s.sentence_index).collect();
        assert_eq!(locals, vec![1, 2, 1]);
        assert!(record.sentences().all(|s| s.reference.is_empty()));
        assert_eq!(
            record.paragraphs[1].sentences[0].audio_file,
            "0000003_BOOKM_S1_C1_P2_S1_en-US.aac"
        );
    }

    #[test]
    fn test_reference_carries_across_paragraphs() {
        let mut counter = SentenceCounter::new();
        let text = "Chapter 1\n\n<!-- REF: 1:1 -->\nSentence A.\n\nSentence B.\n<!-- REF: 1:2 -->\nSentence C.";
        let record = engine()
            .process_chapter(text, &coords(1), &mut counter)
            .unwrap();
        assert_eq!(
            references(&record),
            vec![
                ("Sentence A.", "1:1"),
                ("Sentence B.", "1:1"),
                ("Sentence C.", "1:2")
            ]
        );

        let next = engine()
            .process_chapter("Chapter 2\n\nFresh start.", &coords(2), &mut counter)
            .unwrap();
        assert_eq!(references(&next), vec![("Fresh start.", "")]);
        assert_eq!(next.paragraphs[0].sentences[0].global_sentence_index, 4);
    }

    #[test]
    fn test_marker_only_paragraph_dropped() {
        let mut counter = SentenceCounter::new();
        let text = "Title\n\n<!-- REF: 2:1 -->\n\nFirst.\n\n\n\nSecond.";
        let record = engine()
            .process_chapter(text, &coords(4), &mut counter)
            .unwrap();
        assert_eq!(record.paragraphs.len(), 2);
        let indices: Vec<u32> = record.paragraphs.iter().map(|p| p.paragraph_index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(references(&record), vec![("First.", "2:1"), ("Second.", "2:1")]);
        assert_eq!(
            record.paragraphs[1].sentences[0].audio_file,
            "0000002_BOOKM_S1_C4_P2_S1_en-US.aac"
        );
    }

    #[test]
    fn test_local_index_spans_lines_of_paragraph() {
        let mut counter = SentenceCounter::new();
        let text = "Title\n\nOne. Two.\nThree.";
        let record = engine()
            .process_chapter(text, &coords(1), &mut counter)
            .unwrap();
        assert_eq!(record.paragraphs.len(), 1);
        let locals: Vec<u32> = record.sentences().map(|s| s.sentence_index).collect();
        assert_eq!(locals, vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_text_skipped_without_advancing() {
        let mut counter = SentenceCounter::new();
        assert!(engine()
            .process_chapter("  \n\n ", &coords(1), &mut counter)
            .is_none());
        assert_eq!(counter.peek(), 1);
    }

    #[test]
    fn test_title_only_chapter_has_no_paragraphs() {
        let mut counter = SentenceCounter::new();
        let record = engine()
            .process_chapter("Lonely Title\n", &coords(1), &mut counter)
            .unwrap();
        assert!(record.paragraphs.is_empty());
        assert_eq!(counter.peek(), 1);
    }

    #[test]
    fn test_draft_is_pure_and_assign_is_ordered() {
        let engine = engine();
        let a = engine.draft("A\n\nOne. Two.").unwrap();
        let b = engine.draft("B\n\nThree.").unwrap();
        assert_eq!(a.sentence_count(), 2);

        let mut counter = SentenceCounter::new();
        let first = a.assign(&coords(1), &mut counter);
        let second = b.assign(&coords(2), &mut counter);
        assert_eq!(first.sentences().last().unwrap().global_sentence_index, 2);
        assert_eq!(second.sentences().next().unwrap().global_sentence_index, 3);
        assert_ne!(first.chapter_id, second.chapter_id);
    }

    #[test]
    fn test_structural_marker_in_body_is_segmented() {
        let mut counter = SentenceCounter::new();
        let text = "Title\n\n<!-- CHAPTER: Stray heading -->\nA sentence.";
        let record = engine()
            .process_chapter(text, &coords(1), &mut counter)
            .unwrap();
        let texts: Vec<&str> = record.sentences().map(|s| s.text.as_str()).collect();
        assert_eq!(texts.len(), 2);
        assert!(texts[0].contains("CHAPTER: Stray heading"));
        assert_eq!(texts[1], "A sentence.");
        assert_eq!(counter.peek(), 3);
    }

    #[test]
    fn test_blank_first_line_keeps_body() {
        let mut counter = SentenceCounter::new();
        let record = engine()
            .process_chapter("\nHello world.", &coords(1), &mut counter)
            .unwrap();
        assert_eq!(record.chapter_title, "");
        assert_eq!(references(&record), vec![("Hello world.", "")]);
        assert_eq!(counter.peek(), 2);
    }

    #[test]
    fn test_segmenter_fallback_uses_whole_line() {
        let silent: Arc<dyn SentenceSegmenter> = Arc::new(|_: &str| Vec::<String>::new());
        let engine = SegmentationEngine::new(silent);
        let mut counter = SentenceCounter::new();
        let record = engine
            .process_chapter("T\n\nNo split here. Really.", &coords(1), &mut counter)
            .unwrap();
        assert_eq!(
            references(&record),
            vec![("No split here. Really.", "")]
        );
    }
}
