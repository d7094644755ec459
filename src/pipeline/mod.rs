//! Analysis pipeline: scan → parse → link graph → clusters → token estimates
//! → recommendation → report.
//!
//! Every stage is a pure function of its inputs plus [`Config`], so the same
//! tree and config always produce an equal [`AnalysisReport`].

pub mod cluster;
pub mod links;
pub mod recommender;
pub mod report;
pub mod scanner;
pub mod tokens;

use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use cluster::TopicClusterer;
use links::LinkGraph;
use recommender::Recommender;
use report::AnalysisReport;
use scanner::RepoScanner;
use tokens::TokenEstimator;

pub struct Analyzer {
    config: Config,
}

impl Analyzer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every stage over the repository at `root`.
    /// Fails only when the root itself is missing or the exclude patterns are invalid.
    pub fn analyze(&self, root: &Path) -> Result<AnalysisReport> {
        let scan = RepoScanner::new(root, &self.config.scan)?.scan()?;
        let documents = &scan.documents;

        let graph = LinkGraph::build(documents);
        let clusters =
            TopicClusterer::new(self.config.clustering.similarity_threshold).cluster(documents);
        let estimates =
            TokenEstimator::new(self.config.tokens.clone()).estimate(documents, &clusters);
        let recommendation = Recommender::new(self.config.tiers.clone()).recommend(
            documents,
            &graph,
            &clusters,
            &estimates,
        );

        info!(
            documents = documents.len(),
            clusters = clusters.len(),
            edges = graph.edges().len(),
            tokens = estimates.total,
            template = %recommendation.template,
            "Analysis complete"
        );

        Ok(AnalysisReport::assemble(
            &root.display().to_string(),
            &scan,
            &graph,
            &clusters,
            &estimates,
            recommendation,
        ))
    }
}
