use crate::evaluator::evaluate_node;
use crate::registry::PredicateRegistry;
use crate::types::{Fit, FilterOutcome, FilterResponse};
use crate::{Result, SchedulerError};
use fitgate_core::descriptor::UNNAMED;
use fitgate_core::{Descriptor, Node, Pod};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn, Span};

/// What to do with a node whose predicates could not be evaluated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PredicateErrorPolicy {
    /// Fail the whole filter call; no partial partition is returned
    #[default]
    FailCall,
    /// Reject the node, reporting the predicate error as its reason
    RejectNode,
}

impl FromStr for PredicateErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fail-call" => Ok(Self::FailCall),
            "reject-node" => Ok(Self::RejectNode),
            other => Err(format!(
                "unknown predicate error policy '{}', expected 'fail-call' or 'reject-node'",
                other
            )),
        }
    }
}

impl fmt::Display for PredicateErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FailCall => f.write_str("fail-call"),
            Self::RejectNode => f.write_str("reject-node"),
        }
    }
}

/// Configuration for the filter service
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Maximum number of blocking tasks evaluating nodes of one call
    pub parallelism: usize,
    /// Handling of predicate errors
    pub on_predicate_error: PredicateErrorPolicy,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            parallelism: 1,
            on_predicate_error: PredicateErrorPolicy::FailCall,
        }
    }
}

/// Partitions candidate nodes into admissible and rejected
///
/// Stateless apart from the shared, read-only registry; every call works on
/// freshly allocated data.
#[derive(Debug, Clone)]
pub struct FilterService {
    registry: Arc<PredicateRegistry>,
    config: FilterConfig,
}

impl FilterService {
    /// Create a new filter service
    pub fn new(registry: Arc<PredicateRegistry>, config: FilterConfig) -> Self {
        Self { registry, config }
    }

    /// Registry the service evaluates
    pub fn registry(&self) -> &PredicateRegistry {
        &self.registry
    }

    /// Service configuration
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Filter the candidates, folding any failure into the response
    pub fn filter(&self, workload: &Pod, nodes: &[Node]) -> FilterResponse {
        FilterResponse::from_result(self.try_filter(workload, nodes))
    }

    /// Filter the candidates one after another
    ///
    /// Runs on the caller's thread; a panicking predicate unwinds the caller.
    pub fn try_filter(&self, workload: &Pod, nodes: &[Node]) -> Result<FilterOutcome> {
        validate_candidates(nodes)?;

        let verdicts = nodes
            .iter()
            .map(|node| self.verdict(workload, node))
            .collect::<Result<Vec<_>>>()?;

        Ok(self.assemble(workload, nodes, verdicts))
    }

    /// Filter the candidates on up to `parallelism` blocking tasks
    pub async fn filter_concurrent(&self, workload: Arc<Pod>, nodes: Arc<[Node]>) -> FilterResponse {
        FilterResponse::from_result(self.try_filter_concurrent(workload, nodes).await)
    }

    /// Concurrent variant of [`FilterService::try_filter`]
    ///
    /// Candidates are split into contiguous chunks and each verdict is stored
    /// in the slot of its candidate index, so the admissible list keeps the
    /// input order whatever order the tasks finish in. When several nodes
    /// fail, the error reported is the one of the earliest node, as in the
    /// sequential path.
    ///
    /// Evaluation always runs on blocking tasks, even with a single worker,
    /// so a panicking predicate becomes an internal error for the call.
    pub async fn try_filter_concurrent(
        &self,
        workload: Arc<Pod>,
        nodes: Arc<[Node]>,
    ) -> Result<FilterOutcome> {
        let span = Span::current();
        let workers = self.config.parallelism.min(nodes.len());
        if workers <= 1 {
            let service = self.clone();
            return tokio::task::spawn_blocking(move || {
                let _entered = span.enter();
                service.try_filter(&workload, &nodes)
            })
            .await
            .map_err(|e| {
                SchedulerError::internal_error(format!("Node evaluation task failed: {}", e))
            })?;
        }

        validate_candidates(&nodes)?;

        let chunk_size = nodes.len().div_ceil(workers);
        let chunk_count = nodes.len().div_ceil(chunk_size);
        debug!(
            candidates = nodes.len(),
            chunks = chunk_count,
            "Evaluating candidates concurrently"
        );

        let mut tasks = JoinSet::new();
        for chunk in 0..chunk_count {
            let start = chunk * chunk_size;
            let end = (start + chunk_size).min(nodes.len());
            let service = self.clone();
            let workload = workload.clone();
            let nodes = nodes.clone();
            let span = span.clone();

            tasks.spawn_blocking(move || {
                let _entered = span.enter();
                let verdicts = nodes[start..end]
                    .iter()
                    .map(|node| service.verdict(&workload, node))
                    .collect::<Result<Vec<_>>>();
                (chunk, verdicts)
            });
        }

        let mut chunks: Vec<Option<Result<Vec<Fit>>>> = (0..chunk_count).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            let (chunk, verdicts) = joined.map_err(|e| {
                SchedulerError::internal_error(format!("Node evaluation task failed: {}", e))
            })?;
            chunks[chunk] = Some(verdicts);
        }

        let mut verdicts = Vec::with_capacity(nodes.len());
        for (chunk, slot) in chunks.into_iter().enumerate() {
            let chunk_verdicts = slot.ok_or_else(|| {
                SchedulerError::internal_error(format!("No verdicts for chunk {}", chunk))
            })??;
            verdicts.extend(chunk_verdicts);
        }

        Ok(self.assemble(&workload, &nodes, verdicts))
    }

    /// Evaluate one node, applying the predicate error policy
    fn verdict(&self, workload: &Pod, node: &Node) -> Result<Fit> {
        let err = match evaluate_node(workload, node, &self.registry) {
            Ok(fit) => return Ok(fit),
            Err(err) => err,
        };

        match (self.config.on_predicate_error, err) {
            (
                PredicateErrorPolicy::RejectNode,
                SchedulerError::PredicateFailed {
                    predicate,
                    node,
                    source,
                },
            ) => {
                warn!(
                    predicate = %predicate,
                    node = %node,
                    error = %source,
                    "Predicate error, rejecting node"
                );
                Ok(Fit::fail(format!(
                    "predicate {} could not be evaluated: {}",
                    predicate, source
                )))
            }
            (_, err) => Err(err),
        }
    }

    /// Partition the candidates by their verdicts
    fn assemble(&self, workload: &Pod, nodes: &[Node], verdicts: Vec<Fit>) -> FilterOutcome {
        let mut outcome = FilterOutcome::default();

        for (node, fit) in nodes.iter().zip(verdicts) {
            if fit.fits {
                outcome.admissible.push(node.clone());
            } else {
                outcome
                    .rejected
                    .insert(node.name().unwrap_or(UNNAMED).to_string(), fit.joined_reasons());
            }
        }

        info!(
            workload = %workload.display_name(),
            candidates = nodes.len(),
            admissible = outcome.admissible.len(),
            rejected = outcome.rejected.len(),
            "Filtered candidate nodes"
        );

        outcome
    }
}

/// Every candidate needs a unique name to be keyed in the rejected map
fn validate_candidates(nodes: &[Node]) -> Result<()> {
    let mut seen = HashSet::with_capacity(nodes.len());

    for (index, node) in nodes.iter().enumerate() {
        let name = node.name().ok_or_else(|| {
            SchedulerError::invalid_candidate(format!("node at index {} has no name", index))
        })?;

        if !seen.insert(name) {
            return Err(SchedulerError::invalid_candidate(format!(
                "node {} appears more than once",
                name
            )));
        }
    }

    Ok(())
}
