//! Passage retrieval by token overlap

use std::collections::HashSet;

use crate::ports::Passage;

/// Passages used when the corpus is empty or unreadable
pub fn default_corpus() -> Vec<Passage> {
    vec![
        Passage::new(
            "banana_leaf_spot",
            "Leaf spot in banana is usually caused by a fungus. It can be controlled \
             with fungicides. Keep the soil well drained and watch the plants for pests.",
        ),
        Passage::new(
            "pesticide_rotation",
            "Do not keep using the same pesticide season after season. Rotate products \
             and consult your local Krishi Bhavan before changing treatment.",
        ),
    ]
}

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 1)
        .map(str::to_lowercase)
        .collect()
}

/// Up to `top_k` passages, most overlapping with `question` first; ties
/// keep ascending id order
pub fn rank_passages(question: &str, passages: Vec<Passage>, top_k: usize) -> Vec<Passage> {
    let query = tokens(question);
    let mut scored: Vec<(usize, Passage)> = passages
        .into_iter()
        .map(|p| {
            let score = tokens(&p.text).intersection(&query).count();
            (score, p)
        })
        .collect();

    scored.sort_by(|(a_score, a), (b_score, b)| b_score.cmp(a_score).then_with(|| a.id.cmp(&b.id)));
    scored.into_iter().take(top_k).map(|(_, p)| p).collect()
}
