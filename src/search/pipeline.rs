//! The `CausalSearch` orchestrator: runs every stage in order over one state.

use super::colliders::{collider_triples, find_colliders};
use super::conflicts::{resolve_conflicts, Resolution};
use super::rules::{propagate, Application};
use super::skeleton::{discover, OrderStats};
use super::state::{Pdag, SearchContext, SearchState};
use super::strength::{estimate_directed, estimate_undirected, PathRecord, StrengthReport};
use super::unreliable::{retract_unreliable, Retraction};
use crate::config::SearchConfig;
use crate::data::Dataset;
use crate::error::SearchError;
use crate::graph::{EdgeMark, VarId, VarPair};
use crate::stats::{IndependenceOracle, PartialCorrelationTest};
use tracing::info;

/// A configured search over one set of variables.
///
/// Holds the names, the oracle and the config; every call to `run` builds a
/// fresh `SearchState`, so a `CausalSearch` can be run repeatedly.
#[derive(Debug)]
pub struct CausalSearch<O: IndependenceOracle = PartialCorrelationTest> {
    names: Vec<String>,
    oracle: O,
    config: SearchConfig,
}

impl CausalSearch<PartialCorrelationTest> {
    /// Prepares a search over `dataset` with the partial-correlation oracle.
    pub fn new(dataset: &Dataset, config: SearchConfig) -> Result<Self, SearchError> {
        if dataset.n_vars() == 0 {
            return Err(SearchError::MissingInput("dataset has no variables".into()));
        }
        if dataset.n_rows() == 0 {
            return Err(SearchError::MissingInput("dataset has no observations".into()));
        }
        Self::with_oracle(dataset.names().to_vec(), PartialCorrelationTest::new(dataset), config)
    }
}

impl<O: IndependenceOracle> CausalSearch<O> {
    /// Prepares a search with any oracle. `names[i]` names `VarId(i)`.
    pub fn with_oracle(names: Vec<String>, oracle: O, config: SearchConfig) -> Result<Self, SearchError> {
        if names.is_empty() {
            return Err(SearchError::MissingInput("no variables to search".into()));
        }
        config.validate()?;
        Ok(Self { names, oracle, config })
    }

    pub fn config(&self) -> &SearchConfig { &self.config }

    pub fn names(&self) -> &[String] { &self.names }

    fn context(&self) -> SearchContext<'_, O> {
        SearchContext::new(&self.names, &self.oracle, &self.config)
    }

    /// The directed analysis: skeleton, colliders, conflict resolution,
    /// unreliable-direction correction, rule propagation, strengths.
    pub fn run(&self) -> SearchOutcome {
        let ctx = self.context();
        info!(variables = self.names.len(), alpha = self.config.alpha, max_order = self.config.max_order, "directed search started");

        let (mut state, order_stats) = discover(&ctx);
        state.directed = find_colliders(&state.skeleton, &state.sepsets);
        let colliders = collider_triples(&state.directed).into_iter().collect();
        info!(colliders = state.directed.len(), "colliders oriented");

        let resolutions = resolve_conflicts(&ctx, &mut state);
        let retractions = retract_unreliable(&ctx, &mut state);
        let applications = propagate(&ctx, &mut state);
        let report = estimate_directed(&ctx, &state);

        SearchOutcome {
            names: self.names.clone(),
            order_stats,
            state,
            colliders,
            resolutions,
            retractions,
            applications,
            report,
        }
    }

    /// The undirected analysis: skeleton discovery, then neighbourhood-adjusted
    /// strengths for every remaining edge. No orientation is attempted.
    pub fn run_undirected(&self) -> SearchOutcome {
        let ctx = self.context();
        info!(variables = self.names.len(), alpha = self.config.alpha, max_order = self.config.max_order, "undirected search started");

        let (state, order_stats) = discover(&ctx);
        let report = estimate_undirected(&ctx, &state);
        SearchOutcome {
            names: self.names.clone(),
            order_stats,
            state,
            colliders: Vec::new(),
            resolutions: Vec::new(),
            retractions: Vec::new(),
            applications: Vec::new(),
            report,
        }
    }
}

/// Everything one run produced: the final graph, the per-stage logs and the
/// significant path records.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub names: Vec<String>,
    pub order_stats: Vec<OrderStats>,
    pub state: SearchState,
    /// Unshielded colliders `(x, y, z)` as first detected, before any
    /// conflict resolution or retraction.
    pub colliders: Vec<(VarId, VarId, VarId)>,
    pub resolutions: Vec<(VarPair, Resolution)>,
    pub retractions: Vec<Retraction>,
    pub applications: Vec<Application>,
    pub report: StrengthReport,
}

impl SearchOutcome {
    pub fn records(&self) -> &[PathRecord] { &self.report.records }

    pub fn into_records(self) -> Vec<PathRecord> { self.report.records }

    pub fn pdag(&self) -> Pdag { self.state.to_pdag() }

    fn id(&self, name: &str) -> Result<VarId, SearchError> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(VarId::new)
            .ok_or_else(|| SearchError::UnknownVariable(name.to_string()))
    }

    /// The name of `id`, or `None` for an id outside this run.
    pub fn name(&self, id: VarId) -> Option<&str> { self.names.get(id.index()).map(String::as_str) }

    fn label(&self, id: VarId) -> String {
        self.name(id).map_or_else(|| format!("#{}", id.0), str::to_string)
    }

    /// Whether `a` and `b` are adjacent in the final skeleton.
    pub fn adjacent(&self, a: &str, b: &str) -> Result<bool, SearchError> {
        Ok(self.state.skeleton.has_edge(self.id(a)?, self.id(b)?))
    }

    /// How the final graph relates `a` to `b`, read from `a`'s side:
    /// `Directed` means `a -> b`. `None` when `b -> a` or not adjacent.
    pub fn mark(&self, a: &str, b: &str) -> Result<Option<EdgeMark>, SearchError> {
        let (a, b) = (self.id(a)?, self.id(b)?);
        if !self.state.skeleton.has_edge(a, b) {
            return Ok(None);
        }
        let directed = &self.state.directed;
        Ok(match (directed.contains(a, b), directed.contains(b, a)) {
            (true, true) => Some(EdgeMark::Bidirected),
            (true, false) => Some(EdgeMark::Directed),
            (false, true) => None,
            (false, false) => Some(EdgeMark::Undirected),
        })
    }

    /// Skeleton edges as name pairs, sorted by id.
    pub fn skeleton_edges(&self) -> Vec<(String, String)> {
        self.state
            .skeleton
            .edges()
            .into_iter()
            .map(|p| (self.label(p.first()), self.label(p.second())))
            .collect()
    }

    /// Detected colliders as `(x, y, z)` name triples meaning `x -> z <- y`.
    pub fn collider_names(&self) -> Vec<(String, String, String)> {
        self.colliders
            .iter()
            .map(|&(x, y, z)| (self.label(x), self.label(y), self.label(z)))
            .collect()
    }
}

/// Runs the directed analysis over `dataset` with the default oracle.
pub fn run_directed_analysis(dataset: &Dataset, alpha: f64, max_order: usize) -> Result<Vec<PathRecord>, SearchError> {
    Ok(CausalSearch::new(dataset, SearchConfig::new(alpha, max_order))?.run().into_records())
}

/// Runs the undirected analysis over `dataset` with the default oracle.
pub fn run_undirected_analysis(dataset: &Dataset, alpha: f64, max_order: usize) -> Result<Vec<PathRecord>, SearchError> {
    Ok(CausalSearch::new(dataset, SearchConfig::new(alpha, max_order))?.run_undirected().into_records())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::stats::{StatError, TestOutcome};

    /// Declares `0 ⟂ 1` unconditionally and everything else dependent.
    #[derive(Debug)]
    struct ColliderOracle;

    impl IndependenceOracle for ColliderOracle {
        fn test(&self, x: VarId, y: VarId, given: &[VarId]) -> Result<TestOutcome, StatError> {
            let independent = VarPair::new(x, y) == VarPair::new(VarId(0), VarId(1)) && given.is_empty();
            Ok(if independent { TestOutcome { r: 0.0, p_value: 0.9 } } else { TestOutcome { r: 0.6, p_value: 1e-4 } })
        }
    }

    fn names() -> Vec<String> { vec!["x".into(), "y".into(), "z".into()] }

    #[test]
    fn test_empty_dataset_is_missing_input() {
        let err = CausalSearch::new(&Dataset::default(), SearchConfig::default()).unwrap_err();
        assert!(matches!(err, SearchError::MissingInput(_)));
    }

    #[test]
    fn test_no_names_is_missing_input() {
        let err = CausalSearch::with_oracle(Vec::new(), ColliderOracle, SearchConfig::default()).unwrap_err();
        assert!(matches!(err, SearchError::MissingInput(_)));
    }

    #[test]
    fn test_invalid_alpha_is_rejected() {
        let err = CausalSearch::with_oracle(names(), ColliderOracle, SearchConfig::new(0.0, 2)).unwrap_err();
        assert!(matches!(err, SearchError::InvalidConfig(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_run_orients_collider() {
        let search = CausalSearch::with_oracle(names(), ColliderOracle, SearchConfig::default()).unwrap();
        let outcome = search.run();

        assert_eq!(outcome.skeleton_edges(), vec![("x".into(), "z".into()), ("y".into(), "z".into())]);
        assert_eq!(outcome.collider_names(), vec![("x".into(), "y".into(), "z".into())]);
        assert_eq!(outcome.mark("x", "z").unwrap(), Some(EdgeMark::Directed));
        assert_eq!(outcome.mark("z", "x").unwrap(), None);
        assert!(!outcome.adjacent("x", "y").unwrap());

        let shape: Vec<(&str, &str, EdgeMark)> =
            outcome.records().iter().map(|r| (r.source.as_str(), r.target.as_str(), r.direction)).collect();
        assert_eq!(shape, vec![("x", "z", EdgeMark::Directed), ("y", "z", EdgeMark::Directed)]);
        assert_eq!(outcome.records()[0].controls, vec!["y".to_string()]);
    }

    #[test]
    fn test_run_undirected_marks_every_edge() {
        let search = CausalSearch::with_oracle(names(), ColliderOracle, SearchConfig::default()).unwrap();
        let outcome = search.run_undirected();
        assert!(outcome.colliders.is_empty());
        assert!(outcome.records().iter().all(|r| r.direction == EdgeMark::Undirected));
        assert_eq!(outcome.records().len(), 2);
    }

    #[test]
    fn test_unknown_variable_lookup() {
        let search = CausalSearch::with_oracle(names(), ColliderOracle, SearchConfig::default()).unwrap();
        let err = search.run().adjacent("x", "w").unwrap_err();
        assert!(matches!(err, SearchError::UnknownVariable(name) if name == "w"));
    }

    #[test]
    fn test_name_lookup_outside_run_is_none() {
        let search = CausalSearch::with_oracle(names(), ColliderOracle, SearchConfig::default()).unwrap();
        let outcome = search.run();
        assert_eq!(outcome.name(VarId(0)), Some("x"));
        assert_eq!(outcome.name(VarId(2)), Some("z"));
        assert_eq!(outcome.name(VarId(99)), None);
    }
}
