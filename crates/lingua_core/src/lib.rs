pub mod domain;
pub mod graph;
pub mod ports;
pub mod review;

#[cfg(test)]
pub(crate) mod testsupport;

pub use domain::{
    Category, CommitSelection, InputType, Language, Sentence, SentenceAnalysis, SentenceWord,
    User, UserCredentials, Word, WordAnalysis, Wordbook,
};
pub use graph::{GraphBuilder, GraphWindow, WordGraph, DEFAULT_GRAPH_LIMIT};
pub use ports::{PortError, PortResult, SentenceAnalysisService, VocabularyStore};
pub use review::{
    CategoryScope, ReviewBatch, ReviewItem, ReviewQuery, ReviewSelector, DEFAULT_REVIEW_LIMIT,
};
