//! crates/lingua_core/src/graph.rs
//!
//! The graph builder: turns a window of a user's word-sentence associations
//! into a renderable bipartite graph with deduplicated nodes and an edge per
//! association.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::ports::{PortResult, VocabularyStore};

/// Default window size for graph requests.
pub const DEFAULT_GRAPH_LIMIT: u32 = 200;

const WORD_NODE_COLOR: &str = "rgba(255,255,255,1)";

/// A `[offset, offset + limit)` window over the user's associations, ordered
/// by association id ascending so pagination is deterministic.
#[derive(Debug, Clone, Copy)]
pub struct GraphWindow {
    /// `None` means unbounded; `Some(0)` yields an empty graph.
    pub limit: Option<u32>,
    pub offset: u32,
}

impl Default for GraphWindow {
    fn default() -> Self {
        Self {
            limit: Some(DEFAULT_GRAPH_LIMIT),
            offset: 0,
        }
    }
}

/// A word node, keyed `"w{word_id}"`. Its meaning is the first non-empty
/// contextual meaning seen in scan order.
#[derive(Debug, Clone, PartialEq)]
pub struct WordNode {
    pub id: String,
    pub label: String,
    pub meaning: String,
    pub color: String,
}

/// A sentence node, keyed `"s{sentence_id}"`. Brightness encodes how often
/// the sentence has been reviewed.
#[derive(Debug, Clone, PartialEq)]
pub struct SentenceNode {
    pub id: String,
    pub label: String,
    pub review_count: i32,
    pub color: String,
}

/// A directed edge from a sentence node to a word node. One edge per
/// association in the window; duplicates are preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
}

/// The assembled graph. Word nodes come first (in first-seen order), then
/// sentence nodes (in first-seen order); edges follow source scan order.
#[derive(Debug, Clone, Default)]
pub struct WordGraph {
    pub word_nodes: Vec<WordNode>,
    pub sentence_nodes: Vec<SentenceNode>,
    pub edges: Vec<GraphEdge>,
}

pub fn word_node_id(word_id: i64) -> String {
    format!("w{word_id}")
}

pub fn sentence_node_id(sentence_id: i64) -> String {
    format!("s{sentence_id}")
}

/// Alpha channel for a sentence node: floors at 0.2 and saturates after five
/// reviews.
fn sentence_brightness(review_count: i32) -> f64 {
    (0.2 + f64::from(review_count) * 0.2).min(1.0)
}

fn sentence_color(review_count: i32) -> String {
    format!("rgba(177,156,217,{:.2})", sentence_brightness(review_count))
}

//=========================================================================================
// GraphBuilder
//=========================================================================================

/// Builds the word-sentence graph for one user from the store.
#[derive(Clone)]
pub struct GraphBuilder {
    store: Arc<dyn VocabularyStore>,
}

impl GraphBuilder {
    pub fn new(store: Arc<dyn VocabularyStore>) -> Self {
        Self { store }
    }

    pub async fn build(&self, user_id: Uuid, window: GraphWindow) -> PortResult<WordGraph> {
        if window.limit == Some(0) {
            return Ok(WordGraph::default());
        }

        let rows = self
            .store
            .sentence_word_window(user_id, window.limit, window.offset)
            .await?;

        let mut graph = WordGraph::default();
        let mut word_index: HashMap<i64, usize> = HashMap::new();
        let mut seen_sentences: HashSet<i64> = HashSet::new();

        for row in rows {
            let from = sentence_node_id(row.sentence_id);
            let to = word_node_id(row.word_id);

            match word_index.get(&row.word_id) {
                None => {
                    word_index.insert(row.word_id, graph.word_nodes.len());
                    graph.word_nodes.push(WordNode {
                        id: to.clone(),
                        label: row.word_text,
                        meaning: row.word_meaning,
                        color: WORD_NODE_COLOR.to_string(),
                    });
                }
                Some(&slot) => {
                    // First non-empty meaning wins, in scan order.
                    let node = &mut graph.word_nodes[slot];
                    if node.meaning.is_empty() && !row.word_meaning.is_empty() {
                        node.meaning = row.word_meaning;
                    }
                }
            }

            if seen_sentences.insert(row.sentence_id) {
                graph.sentence_nodes.push(SentenceNode {
                    id: from.clone(),
                    label: row.sentence_text,
                    review_count: row.sentence_review_count,
                    color: sentence_color(row.sentence_review_count),
                });
            }

            graph.edges.push(GraphEdge { from, to });
        }

        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Language;
    use crate::testsupport::MemoryStore;
    use std::collections::HashSet;

    fn builder(store: &Arc<MemoryStore>) -> GraphBuilder {
        GraphBuilder::new(store.clone() as Arc<dyn VocabularyStore>)
    }

    #[tokio::test]
    async fn zero_limit_is_always_empty() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user();
        let wordbook = store.seed_wordbook(user, "wb", Language::English);
        let word = store.seed_word(user, "one", 0);
        let sentence = store.seed_sentence(user, wordbook, "one two", 0);
        store.seed_association(word, sentence, "", "");

        for offset in [0, 5] {
            let graph = builder(&store)
                .build(
                    user,
                    GraphWindow {
                        limit: Some(0),
                        offset,
                    },
                )
                .await
                .unwrap();
            assert!(graph.word_nodes.is_empty());
            assert!(graph.sentence_nodes.is_empty());
            assert!(graph.edges.is_empty());
        }
    }

    #[tokio::test]
    async fn window_of_one_yields_one_of_each() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user();
        let wordbook = store.seed_wordbook(user, "wb", Language::English);
        for i in 0..2 {
            let word = store.seed_word(user, &format!("w{i}"), 0);
            let sentence = store.seed_sentence(user, wordbook, &format!("s{i}"), 0);
            store.seed_association(word, sentence, "", "");
        }

        let graph = builder(&store)
            .build(
                user,
                GraphWindow {
                    limit: Some(1),
                    offset: 0,
                },
            )
            .await
            .unwrap();
        assert_eq!(graph.word_nodes.len(), 1);
        assert_eq!(graph.sentence_nodes.len(), 1);
        assert_eq!(graph.edges.len(), 1);
    }

    #[tokio::test]
    async fn offset_slices_in_association_id_order() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user();
        let wordbook = store.seed_wordbook(user, "wb", Language::English);
        for i in 0..3 {
            let word = store.seed_word(user, &format!("w{i}"), 0);
            let sentence = store.seed_sentence(user, wordbook, &format!("s{i}"), 0);
            store.seed_association(word, sentence, "", "");
        }

        let graph = builder(&store)
            .build(
                user,
                GraphWindow {
                    limit: Some(2),
                    offset: 1,
                },
            )
            .await
            .unwrap();
        assert_eq!(graph.edges.len(), 2);
        // The window starts at the second-lowest association id.
        assert_eq!(graph.word_nodes[0].label, "w1");
        assert_eq!(graph.word_nodes[1].label, "w2");
    }

    #[tokio::test]
    async fn duplicate_pairs_keep_duplicate_edges_but_single_nodes() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user();
        let wordbook = store.seed_wordbook(user, "wb", Language::English);
        let word = store.seed_word(user, "twice", 0);
        let sentence = store.seed_sentence(user, wordbook, "twice seen", 0);
        // Bypass the unique constraint to model a duplicated pair inside the
        // window.
        store.seed_association_unchecked(word, sentence, "first", "");
        store.seed_association_unchecked(word, sentence, "", "");

        let graph = builder(&store)
            .build(user, GraphWindow::default())
            .await
            .unwrap();
        assert_eq!(graph.edges.len(), 2);
        assert_eq!(graph.word_nodes.len(), 1);
        assert_eq!(graph.sentence_nodes.len(), 1);
    }

    #[tokio::test]
    async fn edges_reference_existing_nodes() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user();
        let wordbook = store.seed_wordbook(user, "wb", Language::English);
        for i in 0..4 {
            let word = store.seed_word(user, &format!("w{i}"), 0);
            let sentence = store.seed_sentence(user, wordbook, &format!("s{i}"), i);
            store.seed_association(word, sentence, "m", "");
        }

        let graph = builder(&store)
            .build(user, GraphWindow::default())
            .await
            .unwrap();
        let word_ids: HashSet<&str> =
            graph.word_nodes.iter().map(|n| n.id.as_str()).collect();
        let sentence_ids: HashSet<&str> =
            graph.sentence_nodes.iter().map(|n| n.id.as_str()).collect();
        for edge in &graph.edges {
            assert!(sentence_ids.contains(edge.from.as_str()));
            assert!(word_ids.contains(edge.to.as_str()));
        }
    }

    #[tokio::test]
    async fn first_nonempty_meaning_backfills_word_nodes() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user();
        let wordbook = store.seed_wordbook(user, "wb", Language::English);
        let word = store.seed_word(user, "late", 0);
        let s1 = store.seed_sentence(user, wordbook, "first", 0);
        let s2 = store.seed_sentence(user, wordbook, "second", 0);
        let s3 = store.seed_sentence(user, wordbook, "third", 0);
        store.seed_association(word, s1, "", "");
        store.seed_association(word, s2, "finally", "");
        store.seed_association(word, s3, "ignored", "");

        let graph = builder(&store)
            .build(user, GraphWindow::default())
            .await
            .unwrap();
        assert_eq!(graph.word_nodes.len(), 1);
        assert_eq!(graph.word_nodes[0].meaning, "finally");
    }

    #[tokio::test]
    async fn sentence_brightness_saturates() {
        let store = Arc::new(MemoryStore::new());
        let user = store.seed_user();
        let wordbook = store.seed_wordbook(user, "wb", Language::English);
        let word = store.seed_word(user, "w", 0);
        let fresh = store.seed_sentence(user, wordbook, "fresh", 0);
        let worn = store.seed_sentence(user, wordbook, "worn", 7);
        store.seed_association(word, fresh, "", "");
        store.seed_association(word, worn, "", "");

        let graph = builder(&store)
            .build(user, GraphWindow::default())
            .await
            .unwrap();
        assert_eq!(graph.sentence_nodes[0].color, "rgba(177,156,217,0.20)");
        assert_eq!(graph.sentence_nodes[1].color, "rgba(177,156,217,1.00)");
    }
}
