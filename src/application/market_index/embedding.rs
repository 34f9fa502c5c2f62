//! Deterministic lexical hash embedding. No embedding-model runtime is in
//! scope, so search similarity is approximated with a fixed-width
//! bag-of-character-trigrams vector: each trigram hashes into one of 256
//! buckets, the bucket counts are L2-normalized, and cosine similarity
//! between two such vectors behaves like a crude but stable and
//! content-hash-keyed lexical similarity measure.

const DIMENSIONS: usize = 256;

pub fn embed(text: &str) -> Vec<f32> {
    let mut buckets = vec![0f32; DIMENSIONS];
    let normalized: String = text.to_lowercase();
    let chars: Vec<char> = normalized.chars().collect();

    if chars.len() < 3 {
        if !chars.is_empty() {
            let idx = bucket_for(&normalized);
            buckets[idx] += 1.0;
        }
        return l2_normalize(buckets);
    }

    for window in chars.windows(3) {
        let trigram: String = window.iter().collect();
        let idx = bucket_for(&trigram);
        buckets[idx] += 1.0;
    }

    l2_normalize(buckets)
}

fn bucket_for(s: &str) -> usize {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in s.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    (hash % DIMENSIONS as u64) as usize
}

fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    v
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    dot as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vector_has_stable_dimension() {
        assert_eq!(embed("hello world").len(), DIMENSIONS);
        assert_eq!(embed("").len(), DIMENSIONS);
    }

    #[test]
    fn identical_text_embeds_identically() {
        assert_eq!(embed("will the fed cut rates"), embed("will the fed cut rates"));
    }

    #[test]
    fn similar_text_scores_higher_than_unrelated_text() {
        let query = embed("fed interest rate decision");
        let similar = embed("federal reserve interest rate announcement");
        let unrelated = embed("will it rain in london tomorrow");
        assert!(cosine_similarity(&query, &similar) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn vector_is_unit_length_when_nonempty() {
        let v = embed("some market question");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }
}
