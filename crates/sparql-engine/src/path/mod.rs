//! Property path evaluation: BFS over the triple index driven by a
//! [`PropertyPath`] AST, in either traversal direction.

use sparql_algebra::PropertyPath;
use sparql_common::{ExecutionBudget, Result as EngineResult};
use sparql_model::Term;
use sparql_storage::{Dictionary, Pattern, TermId, TripleIndex, TERM_ID_NOT_FOUND};

use sparql_common::hash::FastHashSet;

/// Which way a path step is being walked: from subject to object, or the
/// reverse (object to subject, used when the object is the bound endpoint).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn flip(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Evaluates property paths against one triple index.
pub struct PathEvaluator<'a> {
    index: &'a TripleIndex,
    dictionary: &'a Dictionary,
}

impl<'a> PathEvaluator<'a> {
    /// Creates an evaluator over `index`, resolving predicate IRIs through `dictionary`.
    #[must_use]
    pub fn new(index: &'a TripleIndex, dictionary: &'a Dictionary) -> Self {
        Self { index, dictionary }
    }

    /// All nodes reachable from `subject` via `path`.
    pub fn objects_from(
        &self,
        subject: TermId,
        path: &PropertyPath,
        budget: &mut ExecutionBudget,
    ) -> EngineResult<FastHashSet<TermId>> {
        self.step(subject, path, Direction::Forward, budget)
    }

    /// All nodes that can reach `object` via `path`.
    pub fn subjects_to(
        &self,
        object: TermId,
        path: &PropertyPath,
        budget: &mut ExecutionBudget,
    ) -> EngineResult<FastHashSet<TermId>> {
        self.step(object, path, Direction::Backward, budget)
    }

    /// Whether `subject` reaches `object` via `path`. `ZeroOrMore`/`OneOrMore`
    /// are the only unbounded-width operators here, so they're the only case
    /// worth a meet-in-the-middle search: everything else is a bounded
    /// single-hop expansion, cheap enough that computing it once and
    /// checking membership is already minimal work.
    pub fn connected(
        &self,
        subject: TermId,
        object: TermId,
        path: &PropertyPath,
        budget: &mut ExecutionBudget,
    ) -> EngineResult<bool> {
        match path {
            PropertyPath::Reverse(inner) => self.connected(object, subject, inner, budget),
            PropertyPath::ZeroOrMore(inner) => self.bidirectional_closure(subject, object, inner, budget, true),
            PropertyPath::OneOrMore(inner) => self.bidirectional_closure(subject, object, inner, budget, false),
            _ => Ok(self.objects_from(subject, path, budget)?.contains(&object)),
        }
    }

    /// Meet-in-the-middle search over a closure's `inner` step: a forward
    /// frontier grows from `subject`, a backward frontier grows from
    /// `object` via `inner` walked in reverse, and each round expands
    /// whichever frontier currently has fewer nodes. Stops the instant a
    /// newly discovered node is already present in the other side's visited
    /// set, without ever materializing the full transitive closure the way
    /// [`PathEvaluator::objects_from`] followed by a membership check would.
    fn bidirectional_closure(
        &self,
        subject: TermId,
        object: TermId,
        inner: &PropertyPath,
        budget: &mut ExecutionBudget,
        include_start: bool,
    ) -> EngineResult<bool> {
        if include_start && subject == object {
            return Ok(true);
        }
        let mut forward_visited = FastHashSet::default();
        let mut backward_visited = FastHashSet::default();
        forward_visited.insert(subject);
        backward_visited.insert(object);
        let mut forward_frontier = vec![subject];
        let mut backward_frontier = vec![object];

        while !forward_frontier.is_empty() && !backward_frontier.is_empty() {
            budget.tick("path-bidirectional-closure")?;
            let expand_forward = forward_frontier.len() <= backward_frontier.len();
            let (frontier, visited, other_visited, dir) = if expand_forward {
                (&mut forward_frontier, &mut forward_visited, &backward_visited, Direction::Forward)
            } else {
                (&mut backward_frontier, &mut backward_visited, &forward_visited, Direction::Backward)
            };
            let mut next = Vec::new();
            for node in frontier.drain(..) {
                for neighbor in self.step(node, inner, dir, budget)? {
                    if other_visited.contains(&neighbor) {
                        return Ok(true);
                    }
                    if visited.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            *frontier = next;
        }
        Ok(false)
    }

    /// Every `(subject, object)` pair connected by `path`, with both
    /// endpoints unbound. Proportional to the number of distinct nodes in
    /// the store; only reached when a query genuinely leaves both path
    /// endpoints as variables.
    pub fn all_pairs(&self, path: &PropertyPath, budget: &mut ExecutionBudget) -> EngineResult<Vec<(TermId, TermId)>> {
        let mut pairs = Vec::new();
        for node in self.all_nodes(budget)? {
            for reached in self.objects_from(node, path, budget)? {
                pairs.push((node, reached));
            }
        }
        Ok(pairs)
    }

    fn all_nodes(&self, budget: &mut ExecutionBudget) -> EngineResult<FastHashSet<TermId>> {
        let mut nodes = FastHashSet::default();
        for (s, _, o) in self.index.lookup(&Pattern::any())? {
            budget.tick("path-node-scan")?;
            nodes.insert(s);
            nodes.insert(o);
        }
        Ok(nodes)
    }

    fn predicate_id(&self, predicate: &sparql_model::NamedNode) -> TermId {
        self.dictionary.get_id(&Term::NamedNode(predicate.clone()))
    }

    fn step(
        &self,
        node: TermId,
        path: &PropertyPath,
        dir: Direction,
        budget: &mut ExecutionBudget,
    ) -> EngineResult<FastHashSet<TermId>> {
        budget.tick("path-step")?;
        match path {
            PropertyPath::Link(predicate) => self.link_step(node, predicate, dir),
            PropertyPath::Reverse(inner) => self.step(node, inner, dir.flip(), budget),
            PropertyPath::Sequence(a, b) => self.sequence_step(node, a, b, dir, budget),
            PropertyPath::Alternative(a, b) => {
                let mut result = self.step(node, a, dir, budget)?;
                result.extend(self.step(node, b, dir, budget)?);
                Ok(result)
            }
            PropertyPath::NegatedPropertySet(excluded) => self.negated_step(node, excluded, dir),
            PropertyPath::ZeroOrOne(inner) => {
                let mut result = self.step(node, inner, dir, budget)?;
                result.insert(node);
                Ok(result)
            }
            PropertyPath::ZeroOrMore(inner) => self.closure(node, inner, dir, budget, true),
            PropertyPath::OneOrMore(inner) => self.closure(node, inner, dir, budget, false),
        }
    }

    fn link_step(&self, node: TermId, predicate: &sparql_model::NamedNode, dir: Direction) -> EngineResult<FastHashSet<TermId>> {
        let predicate_id = self.predicate_id(predicate);
        if predicate_id == TERM_ID_NOT_FOUND {
            return Ok(FastHashSet::default());
        }
        let pattern = match dir {
            Direction::Forward => Pattern { subject: Some(node), predicate: Some(predicate_id), object: None },
            Direction::Backward => Pattern { subject: None, predicate: Some(predicate_id), object: Some(node) },
        };
        let triples = self.index.lookup(&pattern)?;
        Ok(triples
            .into_iter()
            .map(|(s, _, o)| match dir {
                Direction::Forward => o,
                Direction::Backward => s,
            })
            .collect())
    }

    fn negated_step(
        &self,
        node: TermId,
        excluded: &[sparql_model::NamedNode],
        dir: Direction,
    ) -> EngineResult<FastHashSet<TermId>> {
        let excluded_ids: FastHashSet<TermId> =
            excluded.iter().map(|p| self.predicate_id(p)).filter(|&id| id != TERM_ID_NOT_FOUND).collect();
        let pattern = match dir {
            Direction::Forward => Pattern { subject: Some(node), predicate: None, object: None },
            Direction::Backward => Pattern { subject: None, predicate: None, object: Some(node) },
        };
        let triples = self.index.lookup(&pattern)?;
        Ok(triples
            .into_iter()
            .filter(|(_, p, _)| !excluded_ids.contains(p))
            .map(|(s, _, o)| match dir {
                Direction::Forward => o,
                Direction::Backward => s,
            })
            .collect())
    }

    fn sequence_step(
        &self,
        node: TermId,
        a: &PropertyPath,
        b: &PropertyPath,
        dir: Direction,
        budget: &mut ExecutionBudget,
    ) -> EngineResult<FastHashSet<TermId>> {
        // Forward: walk `a` then `b`. Backward: the traversal runs from the
        // object end, so it walks `b` then `a`, both in Backward direction.
        let (first, second) = match dir {
            Direction::Forward => (a, b),
            Direction::Backward => (b, a),
        };
        let mids = self.step(node, first, dir, budget)?;
        let mut result = FastHashSet::default();
        for mid in mids {
            result.extend(self.step(mid, second, dir, budget)?);
        }
        Ok(result)
    }

    /// BFS transitive closure of `inner` from `start`. `include_start`
    /// selects `*` (always includes the start node) vs `+` (includes it
    /// only if a cycle actually leads back to it).
    fn closure(
        &self,
        start: TermId,
        inner: &PropertyPath,
        dir: Direction,
        budget: &mut ExecutionBudget,
        include_start: bool,
    ) -> EngineResult<FastHashSet<TermId>> {
        let mut visited = FastHashSet::default();
        if include_start {
            visited.insert(start);
        }
        let mut frontier = vec![start];
        let mut cycles_back_to_start = false;

        while let Some(node) = frontier.pop() {
            budget.tick("path-closure")?;
            for next in self.step(node, inner, dir, budget)? {
                if next == start {
                    cycles_back_to_start = true;
                }
                if visited.insert(next) {
                    frontier.push(next);
                }
            }
        }

        if cycles_back_to_start {
            visited.insert(start);
        }
        Ok(visited)
    }
}
