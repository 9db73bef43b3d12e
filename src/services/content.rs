/// Content similarity engine
///
/// TF-IDF vectors over each movie's overview and genre names, compared
/// pairwise by cosine similarity. Built once per session.
use ndarray::Array2;
use std::collections::{HashMap, HashSet};

use crate::{
    models::{Catalog, ItemId, Recommendation},
    services::similarity::{sort_by_score_desc, SimilarityMatrix},
};

/// English stop words removed before vectorizing
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst", "an",
    "and", "another", "any", "anyhow", "anyone", "anything", "anyway", "anywhere", "are",
    "around", "as", "at", "back", "be", "became", "because", "become", "becomes", "becoming",
    "been", "before", "beforehand", "behind", "being", "below", "beside", "besides", "between",
    "beyond", "both", "but", "by", "can", "cannot", "could", "do", "done", "down", "due",
    "during", "each", "eg", "either", "else", "elsewhere", "enough", "etc", "even", "ever",
    "every", "everyone", "everything", "everywhere", "except", "few", "first", "for", "former",
    "formerly", "from", "further", "get", "give", "go", "had", "has", "have", "he", "hence",
    "her", "here", "hereafter", "hereby", "herein", "hers", "herself", "him", "himself", "his",
    "how", "however", "i", "ie", "if", "in", "indeed", "into", "is", "it", "its", "itself",
    "just", "keep", "last", "latter", "least", "less", "made", "many", "may", "me", "meanwhile",
    "might", "mine", "more", "moreover", "most", "mostly", "much", "must", "my", "myself",
    "namely", "neither", "never", "nevertheless", "next", "no", "nobody", "none", "noone",
    "nor", "not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one",
    "only", "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out",
    "over", "own", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem",
    "seemed", "seeming", "seems", "several", "she", "should", "since", "so", "some", "somehow",
    "someone", "something", "sometime", "sometimes", "somewhere", "still", "such", "take",
    "than", "that", "the", "their", "them", "themselves", "then", "thence", "there",
    "thereafter", "thereby", "therefore", "therein", "thereupon", "these", "they", "this",
    "those", "though", "through", "throughout", "thru", "thus", "to", "together", "too",
    "toward", "towards", "under", "until", "up", "upon", "us", "very", "via", "was", "we",
    "well", "were", "what", "whatever", "when", "whence", "whenever", "where", "whereafter",
    "whereas", "whereby", "wherein", "whereupon", "wherever", "whether", "which", "while",
    "whither", "who", "whoever", "whole", "whom", "whose", "why", "will", "with", "within",
    "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

/// Lowercased word tokens of at least two characters, stop words removed
pub fn tokenize<'a>(text: &'a str, stop_words: &'a HashSet<&'static str>) -> impl Iterator<Item = String> + 'a {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_lowercase)
        .filter(move |token| !stop_words.contains(token.as_str()))
}

/// Sparse, L2-normalized TF-IDF vector: (term index, weight)
type SparseVector = Vec<(usize, f64)>;

fn tfidf_vectors(documents: &[String]) -> (Vec<SparseVector>, usize) {
    let stop_words: HashSet<&'static str> = STOP_WORDS.iter().copied().collect();
    let mut vocabulary: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<HashMap<usize, f64>> = Vec::with_capacity(documents.len());
    let mut document_frequency: Vec<usize> = Vec::new();

    for document in documents {
        let mut term_counts: HashMap<usize, f64> = HashMap::new();
        for token in tokenize(document, &stop_words) {
            let next = vocabulary.len();
            let term = *vocabulary.entry(token).or_insert(next);
            if term == document_frequency.len() {
                document_frequency.push(0);
            }
            *term_counts.entry(term).or_insert(0.0) += 1.0;
        }
        for &term in term_counts.keys() {
            document_frequency[term] += 1;
        }
        counts.push(term_counts);
    }

    let n = documents.len() as f64;
    let idf: Vec<f64> = document_frequency
        .iter()
        .map(|&df| ((1.0 + n) / (1.0 + df as f64)).ln() + 1.0)
        .collect();

    let vectors = counts
        .into_iter()
        .map(|term_counts| {
            let mut vector: SparseVector = term_counts
                .into_iter()
                .map(|(term, count)| (term, count * idf[term]))
                .collect();
            let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                vector.iter_mut().for_each(|(_, w)| *w /= norm);
            }
            vector
        })
        .collect();

    (vectors, vocabulary.len())
}

/// Cosine similarity of normalized sparse vectors through an inverted index
fn sparse_cosine(vectors: &[SparseVector], vocabulary_size: usize) -> Array2<f64> {
    let mut postings: Vec<Vec<(usize, f64)>> = vec![Vec::new(); vocabulary_size];
    for (doc, vector) in vectors.iter().enumerate() {
        for &(term, weight) in vector {
            postings[term].push((doc, weight));
        }
    }

    let mut similarity = Array2::<f64>::zeros((vectors.len(), vectors.len()));
    for (doc, vector) in vectors.iter().enumerate() {
        for &(term, weight) in vector {
            for &(other, other_weight) in &postings[term] {
                similarity[[doc, other]] += weight * other_weight;
            }
        }
    }
    similarity
}

#[derive(Debug, Clone)]
pub struct ContentEngine {
    similarity: SimilarityMatrix,
    default_seed: Option<ItemId>,
    vocabulary_size: usize,
}

impl ContentEngine {
    pub fn build(catalog: &Catalog) -> Self {
        let documents: Vec<String> = catalog
            .entries()
            .iter()
            .map(|entry| {
                let genres: Vec<&str> = entry.genres.iter().map(String::as_str).collect();
                format!("{} {}", entry.overview, genres.join(" "))
            })
            .collect();

        let (vectors, vocabulary_size) = tfidf_vectors(&documents);
        let values = sparse_cosine(&vectors, vocabulary_size);
        let ids = catalog.entries().iter().map(|e| e.item_id).collect();

        tracing::info!(
            items = catalog.len(),
            vocabulary = vocabulary_size,
            "Content similarity matrix built"
        );

        Self {
            similarity: SimilarityMatrix::new(ids, values),
            default_seed: catalog.first().map(|e| e.item_id),
            vocabulary_size,
        }
    }

    /// Items most similar in content to `seed`
    ///
    /// An unknown seed is replaced by the first catalog entry. Only items
    /// sharing at least one term with the seed are eligible; ties keep
    /// catalog order.
    pub fn recommend(&self, catalog: &Catalog, seed: ItemId, k: usize) -> Vec<Recommendation> {
        let seed = if self.similarity.contains(seed) {
            seed
        } else {
            match self.default_seed {
                Some(fallback) => {
                    tracing::debug!(seed, fallback, "Unknown content seed, using default");
                    fallback
                }
                None => return Vec::new(),
            }
        };

        let Some(row) = self.similarity.row(seed) else {
            return Vec::new();
        };

        let mut scored: Vec<(ItemId, f64)> = self
            .similarity
            .ids()
            .iter()
            .copied()
            .zip(row.iter().copied())
            .filter(|&(item_id, score)| item_id != seed && score > 0.0)
            .collect();
        sort_by_score_desc(&mut scored);

        scored
            .into_iter()
            .filter_map(|(item_id, score)| {
                catalog
                    .get(item_id)
                    .map(|entry| Recommendation::from_entry(entry, score))
            })
            .take(k)
            .collect()
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogEntry;

    fn movie(id: ItemId, title: &str, genres: &[&str], overview: &str) -> CatalogEntry {
        CatalogEntry::new(
            id,
            title,
            genres.iter().map(|g| g.to_string()),
            overview,
            7.0,
            10.0,
        )
    }

    fn space_catalog() -> Catalog {
        Catalog::new(vec![
            movie(1, "Interstellar", &["Science Fiction"], "Astronauts travel through a wormhole in space"),
            movie(2, "Gravity", &["Science Fiction"], "Astronauts stranded in space after an accident"),
            movie(3, "Notting Hill", &["Romance"], "A bookseller falls for a famous actress in London"),
            movie(4, "Apollo 13", &["Drama"], "Astronauts fight to return home after an explosion in space"),
        ])
    }

    #[test]
    fn test_tokenize_drops_stop_words_and_short_tokens() {
        let stop_words: HashSet<&'static str> = STOP_WORDS.iter().copied().collect();
        let tokens: Vec<String> = tokenize("The Man, a Plan: a canal-Panama!", &stop_words).collect();
        assert_eq!(tokens, vec!["man", "plan", "canal", "panama"]);
    }

    #[test]
    fn test_similarity_is_symmetric_with_unit_diagonal() {
        let engine = ContentEngine::build(&space_catalog());
        let sim = engine.similarity();
        assert!((sim.get(1, 1).unwrap() - 1.0).abs() < 1e-9);
        assert!((sim.get(1, 2).unwrap() - sim.get(2, 1).unwrap()).abs() < 1e-12);
        assert_eq!(sim.get(1, 3), Some(0.0));
    }

    #[test]
    fn test_recommend_excludes_seed_and_unrelated() {
        let catalog = space_catalog();
        let engine = ContentEngine::build(&catalog);
        let recs = engine.recommend(&catalog, 1, 10);

        let ids: Vec<ItemId> = recs.iter().map(|r| r.item_id).collect();
        assert!(!ids.contains(&1));
        assert!(!ids.contains(&3));
        assert_eq!(ids.len(), 2);
        assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_recommend_respects_k() {
        let catalog = space_catalog();
        let engine = ContentEngine::build(&catalog);
        assert_eq!(engine.recommend(&catalog, 2, 1).len(), 1);
        assert!(engine.recommend(&catalog, 2, 0).is_empty());
    }

    #[test]
    fn test_unknown_seed_uses_first_entry() {
        let catalog = space_catalog();
        let engine = ContentEngine::build(&catalog);
        let fallback = engine.recommend(&catalog, 999, 3);
        assert!(!fallback.is_empty());
        assert_eq!(fallback, engine.recommend(&catalog, 1, 3));
        assert_eq!(fallback, engine.recommend(&catalog, 12345, 3));
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let catalog = Catalog::new(vec![
            movie(1, "Seed", &[], "heist crew"),
            movie(2, "Twin A", &[], "heist crew"),
            movie(3, "Twin B", &[], "heist crew"),
        ]);
        let engine = ContentEngine::build(&catalog);
        let ids: Vec<ItemId> = engine.recommend(&catalog, 1, 2).iter().map(|r| r.item_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::default();
        let engine = ContentEngine::build(&catalog);
        assert!(engine.recommend(&catalog, 1, 5).is_empty());
    }
}
