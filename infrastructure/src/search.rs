use domain::models::Embedding;

pub struct SearchEngine;

impl SearchEngine {
    pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        dot / (norm_a * norm_b)
    }

    /// Top-k chunk texts ranked by cosine similarity against the query.
    pub fn find_relevant_passages(
        query_embedding: &[f32],
        embeddings: &[Embedding],
        top_k: usize,
    ) -> Vec<String> {
        let mut scored: Vec<(f32, &str)> = embeddings
            .iter()
            .map(|emb| {
                (
                    Self::cosine_similarity(query_embedding, &emb.vector),
                    &emb.text[..],
                )
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(top_k)
            .map(|(_, text)| text.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emb(id: &str, vector: Vec<f32>, text: &str) -> Embedding {
        Embedding {
            id: id.to_string(),
            vector,
            text: text.to_string(),
            path: String::new(),
        }
    }

    #[test]
    fn identical_vectors_score_one() {
        let score = SearchEngine::cosine_similarity(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_scores_zero() {
        assert_eq!(SearchEngine::cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn top_k_returns_most_similar_first() {
        let embeddings = vec![
            emb("a", vec![1.0, 0.0], "aligned"),
            emb("b", vec![0.0, 1.0], "orthogonal"),
            emb("c", vec![0.9, 0.1], "close"),
        ];
        let found = SearchEngine::find_relevant_passages(&[1.0, 0.0], &embeddings, 2);
        assert_eq!(found, vec!["aligned".to_string(), "close".to_string()]);
    }
}
