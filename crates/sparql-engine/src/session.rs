//! Session-scoped query and update execution: the surface a caller
//! actually drives. A session borrows its database's store and plan
//! cache rather than owning them, mirroring `db.session()` returning a
//! borrowing handle.
//!
//! A SPARQL engine's public surface usually takes query *text*, but
//! parsing is out of scope for this crate, so [`Session::query`]/
//! [`Session::prepare`] accept an already-compiled [`QueryForm`] in
//! place of raw text.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use sparql_algebra::{DescribeTarget, QueryForm, SelectVariables, UpdateOperation};
use sparql_common::{Error as EngineError, ExecutionBudget, Result as EngineResult};
use sparql_model::{Term, Triple, Variable};
use sparql_storage::{Dictionary, Pattern, TripleIndex};

use crate::config::EngineConfig;
use crate::executor::{self, Store};
use crate::optimizer::{Optimizer, PlanCache};
use crate::solution::{Mapping, Solution};
use crate::update;
use crate::variables::visible_variables;

/// Per-query knobs. Unlike [`EngineConfig`], which is
/// set once for the whole database, these are supplied fresh on every call
/// and override the matching database default when present.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Overrides [`EngineConfig::default_timeout`] for this call.
    pub timeout: Option<std::time::Duration>,
    /// Overrides [`EngineConfig::optimize`] for this call, if set.
    pub optimize: Option<bool>,
    /// Whether to return an [`ExplainInfo`] alongside the result.
    pub explain: bool,
    /// Whether to consult/populate the plan cache for this call.
    pub use_cache: bool,
    /// An explicit projection, overriding the query form's own variable list.
    pub variables: Option<Vec<Variable>>,
}

impl QueryOptions {
    /// Default options: no per-call timeout override, cache enabled, no
    /// explain output.
    #[must_use]
    pub fn new() -> Self {
        Self { use_cache: true, ..Self::default() }
    }

    /// Sets a per-call timeout override.
    #[must_use]
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Overrides the database's optimizer setting for this call.
    #[must_use]
    pub fn with_optimize(mut self, optimize: bool) -> Self {
        self.optimize = Some(optimize);
        self
    }

    /// Requests plan-explain output alongside the result.
    #[must_use]
    pub fn with_explain(mut self) -> Self {
        self.explain = true;
        self
    }

    /// Disables the plan cache for this call.
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.use_cache = false;
        self
    }

    /// Restricts `SELECT *`'s projection (or overrides an explicit one) to
    /// `variables`.
    #[must_use]
    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = Some(variables);
        self
    }
}

/// Why a plan was shaped the way it was, returned when [`QueryOptions::explain`]
/// is set.
#[derive(Debug, Clone, PartialEq)]
pub struct ExplainInfo {
    /// The fingerprint the plan cache keyed this query under.
    pub fingerprint: String,
    /// Whether the optimized plan came from the cache rather than being
    /// freshly computed.
    pub cache_hit: bool,
    /// The optimized algebra tree actually executed.
    pub optimized_plan: sparql_algebra::GraphPattern,
}

/// The result of a compiled [`QueryForm`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// A `SELECT` result: one mapping per solution.
    Solutions(Vec<Mapping>),
    /// A `CONSTRUCT`/`DESCRIBE` result: a set of triples.
    Graph(Vec<Triple>),
    /// An `ASK` result.
    Boolean(bool),
    /// Plan-explain output, returned alongside the result when requested.
    Explain(ExplainInfo),
}

/// A `prepare`d query form with its recognized `$param` placeholders.
/// Since there is no text parser, a parameter is any
/// [`Variable`] in the compiled form whose name the caller pre-agreed on;
/// [`Session::execute`] binds each by seeding it into the initial solution.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedQuery {
    /// The parameter variable names this form expects to be bound.
    pub parameters: Vec<String>,
    plan: QueryForm,
}

impl PreparedQuery {
    /// Declares `form` as prepared with `parameters` as its `$param` names.
    #[must_use]
    pub fn new(form: QueryForm, parameters: Vec<String>) -> Self {
        Self { plan: form, parameters }
    }
}

/// A borrowed handle over a database's store, configuration, and plan
/// cache. Cheap to create; sessions do not hold locks beyond the duration
/// of a single call.
pub struct Session<'a> {
    index: &'a TripleIndex,
    dictionary: &'a Dictionary,
    config: &'a EngineConfig,
    plan_cache: &'a Arc<Mutex<PlanCache>>,
}

impl<'a> Session<'a> {
    pub(crate) fn new(index: &'a TripleIndex, dictionary: &'a Dictionary, config: &'a EngineConfig, plan_cache: &'a Arc<Mutex<PlanCache>>) -> Self {
        Self { index, dictionary, config, plan_cache }
    }

    /// Runs a compiled query form to completion.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TooManyVariables`] if the pattern exceeds the
    /// configured cap, or any error the executor raises (timeout, iteration
    /// budget, storage failure).
    pub fn query(&self, form: &QueryForm, opts: &QueryOptions) -> EngineResult<QueryOutcome> {
        let store = self.store();
        match form {
            QueryForm::Select { variables, body } => {
                let projected = opts.variables.clone().unwrap_or_else(|| resolve_select_all(variables, body));
                self.check_variable_cap(&projected)?;
                let (solution, explain) = self.run(body, opts)?;
                let solution = solution.into_iter().map(|m| m.project(&projected)).collect::<Vec<_>>();
                self.finish(QueryOutcome::Solutions(solution), explain, opts)
            }
            QueryForm::Ask { body } => {
                self.check_variable_cap(&visible_variables(body))?;
                let (solution, explain) = self.run(body, opts)?;
                self.finish(QueryOutcome::Boolean(!solution.is_empty()), explain, opts)
            }
            QueryForm::Construct { template, body } => {
                self.check_variable_cap(&visible_variables(body))?;
                let (solution, explain) = self.run(body, opts)?;
                let triples = instantiate_construct(template, &solution);
                self.finish(QueryOutcome::Graph(triples), explain, opts)
            }
            QueryForm::Describe { target, body } => {
                self.check_variable_cap(&visible_variables(body))?;
                let (solution, explain) = self.run(body, opts)?;
                let resources = describe_targets(target, &solution)?;
                let triples = concise_bounded_description(&resources, store)?;
                self.finish(QueryOutcome::Graph(triples), explain, opts)
            }
        }
    }

    /// `SELECT`-only streaming entry point. This engine's
    /// executor fully materializes each operator's output rather than
    /// pulling rows lazily, so this returns the same realized solution
    /// sequence as [`Session::query`]'s `Solutions` variant; it exists to
    /// keep a streaming-shaped call available, not to save memory.
    pub fn stream_query(&self, form: &QueryForm, opts: &QueryOptions) -> EngineResult<Vec<Mapping>> {
        match self.query(form, opts)? {
            QueryOutcome::Solutions(rows) => Ok(rows),
            _ => Err(EngineError::InvalidOption("stream_query only supports SELECT".to_string())),
        }
    }

    /// Declares `form` prepared, recognizing every variable in `parameters`
    /// as a `$param` placeholder the caller must bind via [`Session::execute`].
    #[must_use]
    pub fn prepare(&self, form: QueryForm, parameters: Vec<String>) -> PreparedQuery {
        PreparedQuery::new(form, parameters)
    }

    /// Runs a [`PreparedQuery`] with `params` bound as the initial solution.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::MissingParameters`] if `params` omits any of
    /// `prepared.parameters`.
    pub fn execute(&self, prepared: &PreparedQuery, params: &HashMap<String, Term>, opts: &QueryOptions) -> EngineResult<QueryOutcome> {
        let missing: Vec<String> = prepared.parameters.iter().filter(|p| !params.contains_key(*p)).cloned().collect();
        if !missing.is_empty() {
            return Err(EngineError::MissingParameters(missing));
        }
        let seed = params.iter().fold(Mapping::new(), |m, (name, term)| m.with_binding(Variable::new(name), term.clone()));
        let store = self.store();
        let mut budget = self.budget(opts);
        let (plan, _explain) = self.plan(body_of(&prepared.plan), opts);
        let solution = executor::eval(&plan, &vec![seed], store, self.config, &mut budget)?;
        match &prepared.plan {
            QueryForm::Select { variables, body } => {
                let projected = opts.variables.clone().unwrap_or_else(|| resolve_select_all(variables, body));
                Ok(QueryOutcome::Solutions(solution.into_iter().map(|m| m.project(&projected)).collect()))
            }
            QueryForm::Ask { .. } => Ok(QueryOutcome::Boolean(!solution.is_empty())),
            QueryForm::Construct { template, .. } => Ok(QueryOutcome::Graph(instantiate_construct(template, &solution))),
            QueryForm::Describe { target, .. } => {
                let resources = describe_targets(target, &solution)?;
                Ok(QueryOutcome::Graph(concise_bounded_description(&resources, store)?))
            }
        }
    }

    /// Applies an update operation, returning the number of triples
    /// inserted or deleted, and invalidates exactly the cached plans over
    /// the predicates the write touched (the whole cache only for an
    /// operation, like `CLEAR`, that can touch any predicate).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::TooManyTriples`] if the operation exceeds the
    /// configured cap, or [`EngineError::Unsupported`] for a named-graph
    /// target this store cannot represent.
    pub fn update(&self, op: &UpdateOperation) -> EngineResult<usize> {
        let store = self.store();
        let result = update::execute(op, store, self.config)?;
        match update::touched_predicates(op) {
            update::TouchedPredicates::None => {}
            update::TouchedPredicates::All => self.plan_cache.lock().clear(),
            update::TouchedPredicates::Some(predicates) => {
                let mut cache = self.plan_cache.lock();
                for predicate in &predicates {
                    cache.invalidate_predicate(predicate);
                }
            }
        }
        Ok(result)
    }

    /// Total triples currently stored.
    #[must_use]
    pub fn triple_count(&self) -> usize {
        self.index.total_count()
    }

    fn store(&self) -> Store<'a> {
        Store { index: self.index, dictionary: self.dictionary }
    }

    fn budget(&self, opts: &QueryOptions) -> ExecutionBudget {
        let timeout = opts.timeout.or(self.config.default_timeout);
        ExecutionBudget::new(timeout, self.config.max_iterations)
    }

    fn check_variable_cap(&self, variables: &[Variable]) -> EngineResult<()> {
        if variables.len() > self.config.max_variables {
            return Err(EngineError::TooManyVariables { found: variables.len(), limit: self.config.max_variables });
        }
        Ok(())
    }

    /// Optimizes (through the plan cache, if enabled) and evaluates `body`
    /// against a single empty seed mapping.
    fn run(&self, body: &sparql_algebra::GraphPattern, opts: &QueryOptions) -> EngineResult<(Solution, ExplainInfo)> {
        let store = self.store();
        let mut budget = self.budget(opts);
        let (plan, explain) = self.plan(body, opts);
        let solution = executor::eval(&plan, &vec![Mapping::new()], store, self.config, &mut budget)?;
        Ok((solution, explain))
    }

    /// Produces the optimized plan for `body`, consulting and updating the
    /// plan cache when `opts.use_cache` is set.
    fn plan(&self, body: &sparql_algebra::GraphPattern, opts: &QueryOptions) -> (sparql_algebra::GraphPattern, ExplainInfo) {
        let optimize = opts.optimize.unwrap_or(self.config.optimize);
        let fingerprint = crate::optimizer::fingerprint(body);
        if !opts.use_cache || !optimize {
            let optimized = if optimize { Optimizer::new().optimize(body.clone(), self.index, self.dictionary) } else { body.clone() };
            return (optimized.clone(), ExplainInfo { fingerprint, cache_hit: false, optimized_plan: optimized });
        }
        let mut cache = self.plan_cache.lock();
        if let Some(cached) = cache.get(body) {
            return (cached.clone(), ExplainInfo { fingerprint, cache_hit: true, optimized_plan: cached });
        }
        let optimized = Optimizer::new().optimize(body.clone(), self.index, self.dictionary);
        cache.insert(body, optimized.clone());
        (optimized.clone(), ExplainInfo { fingerprint, cache_hit: false, optimized_plan: optimized })
    }

    fn finish(&self, outcome: QueryOutcome, explain: ExplainInfo, opts: &QueryOptions) -> EngineResult<QueryOutcome> {
        if opts.explain {
            return Ok(match outcome {
                QueryOutcome::Solutions(_) | QueryOutcome::Graph(_) | QueryOutcome::Boolean(_) => QueryOutcome::Explain(explain),
                QueryOutcome::Explain(_) => outcome,
            });
        }
        Ok(outcome)
    }
}

/// For `SelectVariables::All`, the projection is "every variable visible
/// in the pattern" rather than a caller-supplied list.
fn resolve_select_all(variables: &SelectVariables, body: &sparql_algebra::GraphPattern) -> Vec<Variable> {
    match variables {
        SelectVariables::All => visible_variables(body),
        SelectVariables::Explicit(vars) => vars.clone(),
    }
}

fn body_of(form: &QueryForm) -> &sparql_algebra::GraphPattern {
    match form {
        QueryForm::Select { body, .. } | QueryForm::Ask { body } | QueryForm::Construct { body, .. } | QueryForm::Describe { body, .. } => body,
    }
}

/// Instantiates `template` once per solution, skipping any row where a
/// template variable is unbound or a predicate position resolves to a
/// non-IRI term: CONSTRUCT drops ungroundable rows rather
/// than erroring the whole query.
fn instantiate_construct(template: &[sparql_algebra::TriplePattern], solution: &[Mapping]) -> Vec<Triple> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for mapping in solution {
        for pattern in template {
            if let Some(triple) = instantiate_triple(pattern, mapping) {
                if seen.insert(triple.clone()) {
                    out.push(triple);
                }
            }
        }
    }
    out
}

fn instantiate_triple(pattern: &sparql_algebra::TriplePattern, mapping: &Mapping) -> Option<Triple> {
    let subject = resolve(&pattern.subject, mapping)?;
    let predicate = match resolve(&pattern.predicate, mapping)? {
        Term::NamedNode(n) => n,
        _ => return None,
    };
    let object = resolve(&pattern.object, mapping)?;
    let subject = match subject {
        Term::NamedNode(n) => sparql_model::Subject::NamedNode(n),
        Term::BlankNode(b) => sparql_model::Subject::BlankNode(b),
        Term::Literal(_) => return None,
    };
    Some(Triple::new(subject, predicate, object))
}

fn resolve(term: &sparql_algebra::GraphTerm, mapping: &Mapping) -> Option<Term> {
    match term {
        sparql_algebra::GraphTerm::Variable(var) => mapping.get(var).cloned(),
        other => other.as_ground_term(),
    }
}

/// Resolves a `DESCRIBE` target into the concrete terms to describe:
/// ground resources named directly, or the bindings a `WHERE` clause's
/// variables took across every solution.
fn describe_targets(target: &DescribeTarget, solution: &[Mapping]) -> EngineResult<Vec<Term>> {
    match target {
        DescribeTarget::Resources(terms) => Ok(terms.iter().filter_map(sparql_algebra::GraphTerm::as_ground_term).collect()),
        DescribeTarget::Variables(vars) => {
            let mut seen = std::collections::HashSet::new();
            let mut out = Vec::new();
            for mapping in solution {
                for var in vars {
                    if let Some(term) = mapping.get(var) {
                        if seen.insert(term.clone()) {
                            out.push(term.clone());
                        }
                    }
                }
            }
            Ok(out)
        }
    }
}

/// Forward CBD: every triple with `resource` as subject, for each
/// resource in `resources`, plus the closure over blank-node objects —
/// any blank node appearing as an object is itself described, and so on
/// recursively, bounded by `visited` so a cycle through blank nodes
/// terminates. Incoming/backward edges are never followed; that would be
/// symmetric CBD, a separate, still-unimplemented extension.
fn concise_bounded_description(resources: &[Term], store: Store<'_>) -> EngineResult<Vec<Triple>> {
    let mut out = Vec::new();
    let mut visited = std::collections::HashSet::new();
    let mut queue: std::collections::VecDeque<Term> = resources.iter().cloned().collect();

    while let Some(resource) = queue.pop_front() {
        if !visited.insert(resource.clone()) {
            continue;
        }
        let subject_id = store.dictionary.get_id(&resource);
        if subject_id == sparql_storage::TERM_ID_NOT_FOUND {
            continue;
        }
        let pattern = Pattern { subject: Some(subject_id), predicate: None, object: None };
        let matches = store.index.lookup(&pattern).map_err(|e| EngineError::StorageError(e.to_string()))?;
        for (s, p, o) in matches {
            if let (Some(subject), Some(sparql_model::Term::NamedNode(predicate)), Some(object)) =
                (store.dictionary.decode(s), store.dictionary.decode(p), store.dictionary.decode(o))
            {
                let subject = match subject {
                    Term::NamedNode(n) => sparql_model::Subject::NamedNode(n),
                    Term::BlankNode(b) => sparql_model::Subject::BlankNode(b),
                    Term::Literal(_) => continue,
                };
                if let Term::BlankNode(_) = &object {
                    if !visited.contains(&object) {
                        queue.push_back(object.clone());
                    }
                }
                out.push(Triple::new(subject, predicate, object));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sparql_algebra::{GraphTerm, TriplePattern};
    use sparql_model::{NamedNode, Quad, Term};

    fn database_with(triples: &[(&str, &str, &str)]) -> crate::database::Database {
        let db = crate::database::Database::new_in_memory();
        let session = db.session();
        let quads = triples
            .iter()
            .map(|(s, p, o)| Quad::in_default_graph(Triple::new(NamedNode::new(*s), NamedNode::new(*p), Term::iri(*o))))
            .collect();
        session.update(&UpdateOperation::InsertData(quads)).unwrap();
        db
    }

    #[test]
    fn select_explicit_projects_only_the_named_variables() {
        let db = database_with(&[("http://ex/a", "http://ex/p", "http://ex/b")]);
        let session = db.session();
        let body = bgp();
        let form = QueryForm::Select { variables: SelectVariables::Explicit(vec![Variable::new("s")]), body };
        let outcome = session.query(&form, &QueryOptions::new()).unwrap();
        match outcome {
            QueryOutcome::Solutions(rows) => {
                assert_eq!(rows.len(), 1);
                assert!(!rows[0].is_bound(&Variable::new("o")));
                assert!(rows[0].is_bound(&Variable::new("s")));
            }
            _ => panic!("expected Solutions"),
        }
    }

    #[test]
    fn ask_reports_whether_the_pattern_matched() {
        let db = database_with(&[("http://ex/a", "http://ex/p", "http://ex/b")]);
        let session = db.session();
        let form = QueryForm::Ask { body: bgp() };
        assert_eq!(session.query(&form, &QueryOptions::new()).unwrap(), QueryOutcome::Boolean(true));
    }

    #[test]
    fn construct_instantiates_a_template_per_solution() {
        let db = database_with(&[("http://ex/a", "http://ex/p", "http://ex/b")]);
        let session = db.session();
        let template = vec![TriplePattern::new(
            GraphTerm::Variable(Variable::new("o")),
            GraphTerm::NamedNode(NamedNode::new("http://ex/derived")),
            GraphTerm::Variable(Variable::new("s")),
        )];
        let form = QueryForm::Construct { template, body: bgp() };
        let outcome = session.query(&form, &QueryOptions::new()).unwrap();
        match outcome {
            QueryOutcome::Graph(triples) => assert_eq!(triples.len(), 1),
            _ => panic!("expected Graph"),
        }
    }

    #[test]
    fn describe_returns_the_forward_cbd_of_the_resource() {
        let db = database_with(&[("http://ex/a", "http://ex/p", "http://ex/b"), ("http://ex/b", "http://ex/q", "http://ex/c")]);
        let session = db.session();
        let form = QueryForm::Describe {
            target: DescribeTarget::Resources(vec![GraphTerm::NamedNode(NamedNode::new("http://ex/a"))]),
            body: GraphPattern::empty_bgp(),
        };
        let outcome = session.query(&form, &QueryOptions::new()).unwrap();
        match outcome {
            QueryOutcome::Graph(triples) => {
                assert_eq!(triples.len(), 1);
                assert_eq!(triples[0].subject(), &sparql_model::Subject::NamedNode(NamedNode::new("http://ex/a")));
            }
            _ => panic!("expected Graph"),
        }
    }

    #[test]
    fn describe_follows_closure_over_blank_node_objects() {
        let db = crate::database::Database::new_in_memory();
        let session = db.session();
        let blank = sparql_model::BlankNode::new("b1");
        let quads = vec![
            Quad::in_default_graph(Triple::new(NamedNode::new("http://ex/a"), NamedNode::new("http://ex/p"), Term::BlankNode(blank.clone()))),
            Quad::in_default_graph(Triple::new(blank, NamedNode::new("http://ex/q"), Term::iri("http://ex/c"))),
        ];
        session.update(&UpdateOperation::InsertData(quads)).unwrap();

        let form = QueryForm::Describe {
            target: DescribeTarget::Resources(vec![GraphTerm::NamedNode(NamedNode::new("http://ex/a"))]),
            body: GraphPattern::empty_bgp(),
        };
        let outcome = session.query(&form, &QueryOptions::new()).unwrap();
        match outcome {
            QueryOutcome::Graph(triples) => {
                assert_eq!(triples.len(), 2);
                assert!(triples.iter().any(|t| t.object() == &Term::iri("http://ex/c")));
            }
            _ => panic!("expected Graph"),
        }
    }

    #[test]
    fn prepare_and_execute_binds_a_parameter_variable() {
        let db = database_with(&[("http://ex/a", "http://ex/p", "http://ex/b")]);
        let session = db.session();
        let form = QueryForm::Select { variables: SelectVariables::Explicit(vec![Variable::new("o")]), body: bgp() };
        let prepared = session.prepare(form, vec!["s".to_string()]);
        let mut params = HashMap::new();
        params.insert("s".to_string(), Term::iri("http://ex/a"));
        let outcome = session.execute(&prepared, &params, &QueryOptions::new()).unwrap();
        assert_eq!(outcome, QueryOutcome::Solutions(vec![Mapping::new().with_binding(Variable::new("o"), Term::iri("http://ex/b"))]));
    }

    #[test]
    fn execute_without_a_required_parameter_is_rejected() {
        let db = database_with(&[]);
        let session = db.session();
        let form = QueryForm::Select { variables: SelectVariables::Explicit(vec![Variable::new("o")]), body: bgp() };
        let prepared = session.prepare(form, vec!["s".to_string()]);
        let result = session.execute(&prepared, &HashMap::new(), &QueryOptions::new());
        assert!(matches!(result, Err(EngineError::MissingParameters(_))));
    }

    #[test]
    fn a_cached_plan_still_sees_data_written_after_it_was_cached() {
        let db = database_with(&[]);
        let session = db.session();
        let form = QueryForm::Select { variables: SelectVariables::Explicit(vec![Variable::new("s")]), body: bgp() };
        session.query(&form, &QueryOptions::new()).unwrap();
        let quad = Quad::in_default_graph(Triple::new(NamedNode::new("http://ex/a"), NamedNode::new("http://ex/p"), Term::iri("http://ex/b")));
        session.update(&UpdateOperation::InsertData(vec![quad])).unwrap();
        let outcome = session.query(&form, &QueryOptions::new()).unwrap();
        assert_eq!(outcome, QueryOutcome::Solutions(vec![Mapping::new().with_binding(Variable::new("s"), Term::iri("http://ex/a"))]));
    }

    #[test]
    fn delete_where_reports_the_predicates_it_touched_and_takes_effect() {
        let db = database_with(&[("http://ex/a", "http://ex/old", "http://ex/b")]);
        let session = db.session();
        let op = UpdateOperation::DeleteWhere(vec![sparql_algebra::QuadPattern::new(
            GraphTerm::Variable(Variable::new("s")),
            GraphTerm::NamedNode(NamedNode::new("http://ex/old")),
            GraphTerm::Variable(Variable::new("o")),
            GraphTerm::Variable(Variable::new("g")),
        )]);
        assert!(!update::touched_predicates(&op).is_empty());
        session.update(&op).unwrap();
        assert_eq!(db.triple_count(), 0);
    }

    fn bgp() -> sparql_algebra::GraphPattern {
        sparql_algebra::GraphPattern::Bgp(vec![TriplePattern::new(
            GraphTerm::Variable(Variable::new("s")),
            GraphTerm::NamedNode(NamedNode::new("http://ex/p")),
            GraphTerm::Variable(Variable::new("o")),
        )])
    }
}
