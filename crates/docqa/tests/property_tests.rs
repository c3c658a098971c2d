//! Property tests for chunking and top-k retrieval

use docqa::ingestion::{CharacterSplitter, TextSplitter};
use docqa::retrieval::VectorIndex;
use docqa::types::{Chunk, Document};
use proptest::prelude::*;

fn arb_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim)
}

/// Splitting without overlap and concatenating chunks reproduces every document
mod prop_chunk_round_trip {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn concatenation_reproduces_documents(
            contents in proptest::collection::vec("\\PC{0,400}", 1..5),
            chunk_size in 1usize..120,
        ) {
            let splitter = CharacterSplitter::new(chunk_size, 0).unwrap();
            let documents: Vec<Document> = contents
                .iter()
                .map(|c| Document::new(c.clone(), "prop.txt"))
                .collect();

            let chunks = splitter.split_documents(&documents);

            for (i, original) in contents.iter().enumerate() {
                let rebuilt: String = chunks
                    .iter()
                    .filter(|c| c.document_index == i)
                    .map(|c| c.text.as_str())
                    .collect();
                prop_assert_eq!(&rebuilt, original);
            }
            prop_assert!(chunks.iter().all(|c| c.char_len() <= chunk_size && c.char_len() > 0));
            for (position, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.index, position);
            }
        }

        #[test]
        fn overlapping_windows_share_their_edges(
            content in "[a-z]{1,300}",
            chunk_size in 2usize..50,
            overlap_frac in 0.0f64..1.0,
        ) {
            let overlap = ((chunk_size as f64) * overlap_frac) as usize % chunk_size;
            let splitter = CharacterSplitter::new(chunk_size, overlap).unwrap();
            let windows = splitter.split_text(&content);

            prop_assert!(!windows.is_empty());
            prop_assert!(content.starts_with(windows[0]));
            prop_assert!(content.ends_with(windows[windows.len() - 1]));
            for pair in windows.windows(2) {
                let tail = &pair[0][pair[0].len() - overlap..];
                prop_assert!(pair[1].starts_with(tail));
            }
        }
    }
}

/// Retrieval never returns more than k hits and orders them by score
mod prop_top_k_bounded {
    use super::*;

    const DIM: usize = 8;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_bounded_and_descending(
            vectors in proptest::collection::vec(arb_embedding(DIM), 0..12),
            query in arb_embedding(DIM),
            k in 1usize..=5,
        ) {
            let chunks: Vec<Chunk> = (0..vectors.len())
                .map(|i| Chunk::new(0, i, format!("chunk {}", i), None))
                .collect();
            let total = chunks.len();
            let index = VectorIndex::build(chunks, vectors).unwrap();

            let hits = index.query(&query, k);

            prop_assert!(hits.len() <= k);
            prop_assert_eq!(hits.len(), k.min(total));
            for pair in hits.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
        }
    }
}
