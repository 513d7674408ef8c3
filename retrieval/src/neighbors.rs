use std::collections::HashSet;

use inkwell_store::ChunkStoreBackend;

use crate::model::HybridResult;

/// Widens each result's content with its immediately adjacent chunks.
///
/// Best-effort: if any neighbor fetch fails, the results are returned
/// unchanged rather than partially expanded.
pub struct NeighborExpander<'a, S: ChunkStoreBackend> {
    store: &'a S,
}

impl<'a, S: ChunkStoreBackend> NeighborExpander<'a, S> {
    /// Wraps `store` for neighbor expansion.
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Expands `results` in place. Each chunk already present among
    /// `results` is never duplicated into a neighbor slot.
    pub async fn expand(&self, results: &mut [HybridResult]) {
        let present: HashSet<_> = results.iter().map(|r| r.chunk.chunk_id).collect();

        let mut expansions = Vec::with_capacity(results.len());
        for result in results.iter() {
            let anchor = &result.chunk;
            let neighbors = match self.store.fetch_neighbors(anchor.chunk_id, 1).await {
                Ok(neighbors) => neighbors,
                Err(_) => return,
            };

            let prev = (anchor.chunk_index > 0)
                .then(|| {
                    neighbors
                        .iter()
                        .find(|n| n.chunk_index + 1 == anchor.chunk_index)
                })
                .flatten()
                .filter(|n| !present.contains(&n.chunk_id));
            let next = neighbors
                .iter()
                .find(|n| n.chunk_index == anchor.chunk_index + 1)
                .filter(|n| !present.contains(&n.chunk_id));

            let mut text = String::new();
            if let Some(prev) = prev {
                text.push_str(&prev.text);
                text.push_str("\n\n");
            }
            text.push_str(&anchor.text);
            if let Some(next) = next {
                text.push_str("\n\n");
                text.push_str(&next.text);
            }
            expansions.push(text);
        }

        for (result, text) in results.iter_mut().zip(expansions) {
            result.chunk.text = text;
        }
    }
}
