/// A search result with its relevance score
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub name: String,
    pub score: f64,
}

impl Eq for SearchResult {}

impl SearchResult {
    pub(crate) fn new(name: String) -> Self {
        Self { name, score: 0.0 }
    }

    pub(crate) fn add_score(&mut self, points: f64) {
        self.score += points;
    }
}
