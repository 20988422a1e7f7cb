//! Property tests for in-memory vector index search ordering.

use proptest::prelude::*;
use serde_json::json;
use tactics_rag::inmemory::InMemoryVectorIndex;
use tactics_rag::vectorstore::VectorIndex;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Generate (id, text, embedding) triples to store.
fn arb_chunk(dim: usize) -> impl Strategy<Value = (String, String, Vec<f32>)> {
    ("[a-z]{3,8}", "[a-z ]{5,30}", arb_normalized_embedding(dim))
}

/// For any set of stored chunks, searching returns matches ordered by
/// descending cosine similarity, at most `top_k` of them, each carrying
/// usable metadata.
mod prop_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_descending_and_bounded_by_top_k(
            chunks in proptest::collection::vec(arb_chunk(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (matches, stored) = rt.block_on(async {
                let index = InMemoryVectorIndex::new();
                for (id, text, embedding) in &chunks {
                    index
                        .insert(id.clone(), embedding.clone(), json!({"text": text}))
                        .await;
                }
                // Duplicate ids overwrite, so count what actually landed.
                let stored = index.len().await;
                let matches = index.search(&query, top_k, true).await.unwrap();
                (matches, stored)
            });

            prop_assert!(matches.len() <= top_k);
            prop_assert!(matches.len() <= stored);

            for window in matches.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }

            for m in &matches {
                prop_assert!(m.is_usable());
            }
        }
    }
}
