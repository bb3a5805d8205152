//! Property tests for vector index search ordering.

use medqa_rag::VectorIndex;
use proptest::prelude::*;

const DIM: usize = 16;

/// Generate a finite embedding of the fixed dimension.
fn arb_embedding() -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, DIM)
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any set of N vectors and any query, `search(query, top_k)` returns
    /// `min(top_k, N)` payloads ordered by non-decreasing distance.
    #[test]
    fn search_returns_min_topk_results_in_distance_order(
        embeddings in proptest::collection::vec(arb_embedding(), 1..20),
        query in arb_embedding(),
        top_k in 1usize..25,
    ) {
        let count = embeddings.len();
        let payloads: Vec<String> = (0..count).map(|i| format!("passage {i}")).collect();

        let mut index = VectorIndex::new(DIM);
        index.build(embeddings.clone(), payloads.clone()).unwrap();

        let results = index.search(&query, top_k).unwrap();
        prop_assert_eq!(results.len(), top_k.min(count));

        // Recompute distances by payload position to check ordering.
        let distance_of = |payload: &String| {
            let i: usize = payload.strip_prefix("passage ").unwrap().parse().unwrap();
            squared_l2(&query, &embeddings[i])
        };
        for window in results.windows(2) {
            prop_assert!(
                distance_of(&window[0]) <= distance_of(&window[1]),
                "results not in ascending distance order"
            );
        }
    }

    /// Searching with `top_k == N` returns every stored payload.
    #[test]
    fn full_search_returns_all_payloads(
        embeddings in proptest::collection::vec(arb_embedding(), 1..20),
        query in arb_embedding(),
    ) {
        let count = embeddings.len();
        let payloads: Vec<String> = (0..count).map(|i| format!("passage {i}")).collect();

        let mut index = VectorIndex::new(DIM);
        index.build(embeddings, payloads.clone()).unwrap();

        let mut results = index.search(&query, count).unwrap();
        let mut expected = payloads;
        results.sort();
        expected.sort();
        prop_assert_eq!(results, expected);
    }
}
