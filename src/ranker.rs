#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    pub index: usize,
    pub label: String,
    pub score: f32,
}

impl Ranked {
    pub fn percent(&self) -> String {
        format_percent(self.score)
    }
}

pub type RankedResult = Vec<Ranked>;

pub fn format_percent(score: f32) -> String {
    format!("{:.2}%", score * 100.0)
}

/// Top `k` labels by score, highest first. Equal scores keep catalog order.
/// `k` larger than the catalog is clamped.
pub fn rank(probs: &[f32], labels: &[String], k: usize) -> RankedResult {
    let mut pairs: Vec<(usize, f32)> = probs
        .iter()
        .copied()
        .enumerate()
        .take(labels.len())
        .collect();

    pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
    pairs.truncate(k.min(labels.len()));

    pairs
        .into_iter()
        .map(|(index, score)| Ranked {
            index,
            label: labels[index].clone(),
            score,
        })
        .collect()
}
