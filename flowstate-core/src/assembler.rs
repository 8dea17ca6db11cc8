//! Book assembler: the only place global token indices are assigned

use crate::config::ReaderConfig;
use crate::container::{open_container, Container};
use crate::error::{FlowstateError, Result};
use crate::filter::ContentFilter;
use crate::loader::{FragmentLoader, FragmentOutcome, SkipReason};
use crate::types::{FragmentRecord, LoadedBook};
use tracing::{debug, info};

/// Summary of one skipped spine entry, kept for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFragment {
    pub index: usize,
    pub href: Option<String>,
    pub reason: SkipReason,
}

/// Assembled book plus the entries that were left out
#[derive(Debug, Clone)]
pub struct Assembly {
    pub book: LoadedBook,
    pub skipped: Vec<SkippedFragment>,
}

/// Walks the spine in order and concatenates accepted fragments
#[derive(Debug, Clone)]
pub struct BookAssembler {
    loader: FragmentLoader,
}

impl BookAssembler {
    pub fn new(config: &ReaderConfig) -> Result<Self> {
        let filter = ContentFilter::new(config.filter.clone())?;
        let loader = FragmentLoader::new(config.fragments.clone(), filter)?;
        Ok(Self { loader })
    }

    /// Open raw bytes as a container and assemble it
    pub fn assemble_bytes(&self, display_name: &str, bytes: Vec<u8>) -> Result<Assembly> {
        let mut container = open_container(display_name, bytes)?;
        self.assemble(container.as_mut())
    }

    /// Build a book from every accepted spine entry, strictly in spine order
    ///
    /// Fails with [`FlowstateError::NoReadableContent`] when nothing survives.
    pub fn assemble(&self, container: &mut dyn Container) -> Result<Assembly> {
        let spine_count = container.spine_len();
        let mut tokens = Vec::new();
        let mut fragments = Vec::new();
        let mut skipped = Vec::new();

        for index in 0..spine_count {
            let Some(entry) = container.spine_entry(index) else {
                debug!(index, "Spine entry missing");
                continue;
            };
            let href = entry.href.clone();

            match self.loader.load(container, entry) {
                FragmentOutcome::Accepted(draft) => {
                    let token_start = tokens.len();
                    tokens.extend(draft.tokens);
                    let token_end = tokens.len();

                    debug!(
                        index,
                        href = href.as_deref().unwrap_or_default(),
                        tokens = token_end - token_start,
                        "Accepted fragment"
                    );

                    fragments.push(FragmentRecord {
                        fragment_index: index,
                        href: draft.entry.href,
                        idref: draft.entry.idref,
                        document: draft.document,
                        text_nodes: draft.text_nodes,
                        token_range: token_start..token_end,
                    });
                }
                FragmentOutcome::Skipped(reason) => {
                    debug!(
                        index,
                        href = href.as_deref().unwrap_or_default(),
                        %reason,
                        "Skipped fragment"
                    );
                    skipped.push(SkippedFragment {
                        index,
                        href,
                        reason,
                    });
                }
            }
        }

        if tokens.is_empty() {
            return Err(FlowstateError::NoReadableContent);
        }

        info!(
            spine_count,
            fragments = fragments.len(),
            tokens = tokens.len(),
            skipped = skipped.len(),
            "Assembled book"
        );

        Ok(Assembly {
            book: LoadedBook::new(spine_count, tokens, fragments),
            skipped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::MemoryContainer;

    fn chapter(words: usize, seed: &str) -> String {
        let body: Vec<String> = (0..words).map(|i| format!("{}{}", seed, i)).collect();
        format!(
            "<html><body><p>{}</p><p>The end of this passage.</p></body></html>",
            body.join(" ")
        )
    }

    fn assembler() -> BookAssembler {
        BookAssembler::new(&ReaderConfig::default()).unwrap()
    }

    #[test]
    fn test_ranges_partition_token_sequence() {
        let mut container = MemoryContainer::new()
            .with_fragment("OEBPS/cover.xhtml", chapter(80, "cover"))
            .with_fragment("OEBPS/ch1.xhtml", chapter(40, "alpha"))
            .with_broken_fragment("OEBPS/ch2.xhtml")
            .with_fragment("OEBPS/ch3.xhtml", chapter(60, "beta"))
            .with_fragment("OEBPS/ch4.xhtml", "<p>Too short.</p>");

        let assembly = assembler().assemble(&mut container).unwrap();
        let book = &assembly.book;

        assert_eq!(book.spine_count(), 5);
        assert_eq!(book.fragments().len(), 2);
        assert_eq!(book.len(), 45 + 65);

        let mut expected_start = 0;
        for fragment in book.fragments() {
            assert_eq!(fragment.token_start(), expected_start);
            assert!(fragment.token_count() >= 30);
            for token in book.fragment_tokens(fragment) {
                assert_eq!(token.fragment_index, fragment.fragment_index);
            }
            expected_start = fragment.token_end();
        }
        assert_eq!(expected_start, book.len());

        assert_eq!(book.fragments()[0].fragment_index, 1);
        assert_eq!(book.fragments()[1].fragment_index, 3);
        assert_eq!(book.token(0).map(|t| t.word.as_str()), Some("alpha0"));
        assert_eq!(book.token(45).map(|t| t.word.as_str()), Some("beta0"));
    }

    #[test]
    fn test_skips_are_reported_not_raised() {
        let mut container = MemoryContainer::new()
            .with_fragment("toc.xhtml", chapter(80, "toc"))
            .with_broken_fragment("ch1.xhtml")
            .with_fragment("ch2.xhtml", chapter(50, "word"));

        let assembly = assembler().assemble(&mut container).unwrap();

        let reasons: Vec<_> = assembly.skipped.iter().map(|s| &s.reason).collect();
        assert!(matches!(reasons[0], SkipReason::NoiseName(term) if term == "toc"));
        assert!(matches!(reasons[1], SkipReason::Unloadable(_)));
        assert_eq!(assembly.skipped.len(), 2);
        // the noise entry was never loaded
        assert_eq!(container.loads(), &[1, 2]);
    }

    #[test]
    fn test_no_readable_content() {
        let mut container = MemoryContainer::new()
            .with_fragment("cover.xhtml", chapter(80, "cover"))
            .with_fragment("ch1.xhtml", "<p>Nothing much.</p>");

        let err = assembler().assemble(&mut container).unwrap_err();
        assert!(matches!(err, FlowstateError::NoReadableContent));
    }

    #[test]
    fn test_empty_spine() {
        let err = assembler().assemble(&mut MemoryContainer::new()).unwrap_err();
        assert!(matches!(err, FlowstateError::NoReadableContent));
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let build = || {
            MemoryContainer::new()
                .with_fragment("a.xhtml", chapter(35, "gamma"))
                .with_fragment("b.xhtml", chapter(70, "delta"))
        };

        let first = assembler().assemble(&mut build()).unwrap().book;
        let second = assembler().assemble(&mut build()).unwrap().book;

        assert_eq!(first.len(), second.len());
        assert_eq!(first.tokens(), second.tokens());
    }

    #[test]
    fn test_assemble_bytes_rejects_wrong_extension() {
        let err = assembler()
            .assemble_bytes("book.mobi", vec![0; 16])
            .unwrap_err();
        assert!(matches!(err, FlowstateError::InvalidInput(_)));
    }
}
