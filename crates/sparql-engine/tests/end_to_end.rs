//! End-to-end scenarios against [`sparql_engine::Database`].

use std::collections::HashSet;

use sparql_algebra::{AggregateExpression, DescribeTarget, Expression, GraphPattern, GraphTarget, GraphTerm, PathPattern, PropertyPath, QueryForm, SelectVariables, TriplePattern, UpdateOperation};
use sparql_model::{xsd, NamedNode, Quad, Term, Triple, Variable};
use sparql_engine::{Database, QueryOptions, QueryOutcome};

fn var(name: &str) -> GraphTerm {
    GraphTerm::Variable(Variable::new(name))
}

fn iri(name: &str) -> GraphTerm {
    GraphTerm::NamedNode(NamedNode::new(name))
}

fn insert_triples(db: &Database, triples: &[(&str, &str, GraphTerm)]) {
    let session = db.session();
    let quads = triples
        .iter()
        .map(|(s, p, o)| {
            let object = match o {
                GraphTerm::NamedNode(n) => Term::NamedNode(n.clone()),
                GraphTerm::Literal(l) => Term::Literal(l.clone()),
                _ => panic!("test fixtures only use named or literal objects"),
            };
            Quad::in_default_graph(Triple::new(NamedNode::new(*s), NamedNode::new(*p), object))
        })
        .collect();
    session.update(&UpdateOperation::InsertData(quads)).unwrap();
}

fn int_literal(n: i64) -> GraphTerm {
    GraphTerm::Literal(sparql_model::Literal::typed(n.to_string(), NamedNode::new(xsd::INTEGER)))
}

#[test]
fn scenario_1_bgp_with_shared_variable() {
    let db = Database::new_in_memory();
    insert_triples(
        &db,
        &[("http://ex/Alice", "http://ex/knows", iri("http://ex/Bob")), ("http://ex/Bob", "http://ex/age", int_literal(30)), ("http://ex/Alice", "http://ex/knows", iri("http://ex/Dave"))],
    );
    let session = db.session();
    let body = GraphPattern::Bgp(vec![
        TriplePattern::new(iri("http://ex/Alice"), iri("http://ex/knows"), var("p")),
        TriplePattern::new(var("p"), iri("http://ex/age"), var("a")),
    ]);
    let form = QueryForm::Select { variables: SelectVariables::Explicit(vec![Variable::new("p"), Variable::new("a")]), body };
    let outcome = session.query(&form, &QueryOptions::new()).unwrap();
    let QueryOutcome::Solutions(rows) = outcome else { panic!("expected Solutions") };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get(&Variable::new("p")), Some(&Term::iri("http://ex/Bob")));
    assert_eq!(rows[0].get(&Variable::new("a")), Some(&Term::typed_literal("30", xsd::INTEGER)));
}

#[test]
fn scenario_2_optional_producing_unbound() {
    let db = Database::new_in_memory();
    insert_triples(
        &db,
        &[
            ("http://ex/Alice", "http://ex/name", GraphTerm::Literal(sparql_model::Literal::simple("Alice"))),
            ("http://ex/Alice", "http://ex/age", GraphTerm::Literal(sparql_model::Literal::simple("30"))),
            ("http://ex/Bob", "http://ex/name", GraphTerm::Literal(sparql_model::Literal::simple("Bob"))),
        ],
    );
    let session = db.session();
    let left = GraphPattern::Bgp(vec![TriplePattern::new(var("s"), iri("http://ex/name"), var("name"))]);
    let right = GraphPattern::Bgp(vec![TriplePattern::new(var("s"), iri("http://ex/age"), var("age"))]);
    let body = GraphPattern::LeftJoin(Box::new(left), Box::new(right), None);
    let form = QueryForm::Select { variables: SelectVariables::Explicit(vec![Variable::new("name"), Variable::new("age")]), body };
    let outcome = session.query(&form, &QueryOptions::new()).unwrap();
    let QueryOutcome::Solutions(rows) = outcome else { panic!("expected Solutions") };
    assert_eq!(rows.len(), 2);
    let bound_ages: Vec<_> = rows.iter().filter(|m| m.is_bound(&Variable::new("age"))).collect();
    let unbound_ages: Vec<_> = rows.iter().filter(|m| !m.is_bound(&Variable::new("age"))).collect();
    assert_eq!(bound_ages.len(), 1);
    assert_eq!(unbound_ages.len(), 1);
}

#[test]
fn scenario_3_zero_or_more_identity_and_closure() {
    let db = Database::new_in_memory();
    insert_triples(&db, &[("http://ex/A", "http://ex/next", iri("http://ex/B")), ("http://ex/B", "http://ex/next", iri("http://ex/C")), ("http://ex/C", "http://ex/next", iri("http://ex/D"))]);
    let session = db.session();
    let body = GraphPattern::Path(PathPattern::new(iri("http://ex/A"), PropertyPath::ZeroOrMore(Box::new(PropertyPath::Link(NamedNode::new("http://ex/next")))), var("n")));
    let form = QueryForm::Select { variables: SelectVariables::Explicit(vec![Variable::new("n")]), body };
    let outcome = session.query(&form, &QueryOptions::new()).unwrap();
    let QueryOutcome::Solutions(rows) = outcome else { panic!("expected Solutions") };
    let found: HashSet<_> = rows.iter().map(|m| m.get(&Variable::new("n")).unwrap().clone()).collect();
    let expected: HashSet<_> = ["http://ex/A", "http://ex/B", "http://ex/C", "http://ex/D"].iter().map(|s| Term::iri(*s)).collect();
    assert_eq!(found, expected);
}

#[test]
fn scenario_4_union_of_disjoint_branches() {
    let db = Database::new_in_memory();
    insert_triples(&db, &[("http://ex/A", "http://ex/knows", iri("http://ex/B")), ("http://ex/C", "http://ex/likes", iri("http://ex/D"))]);
    let session = db.session();
    let left = GraphPattern::Bgp(vec![TriplePattern::new(var("x"), iri("http://ex/knows"), var("y"))]);
    let right = GraphPattern::Bgp(vec![TriplePattern::new(var("x"), iri("http://ex/likes"), var("y"))]);
    let body = GraphPattern::Union(Box::new(left), Box::new(right));
    let form = QueryForm::Select { variables: SelectVariables::Explicit(vec![Variable::new("x"), Variable::new("y")]), body };
    let outcome = session.query(&form, &QueryOptions::new()).unwrap();
    let QueryOutcome::Solutions(rows) = outcome else { panic!("expected Solutions") };
    assert_eq!(rows.len(), 2);
    let pairs: HashSet<_> = rows.iter().map(|m| (m.get(&Variable::new("x")).unwrap().clone(), m.get(&Variable::new("y")).unwrap().clone())).collect();
    assert!(pairs.contains(&(Term::iri("http://ex/A"), Term::iri("http://ex/B"))));
    assert!(pairs.contains(&(Term::iri("http://ex/C"), Term::iri("http://ex/D"))));
}

#[test]
fn scenario_5_group_by_with_sum() {
    let db = Database::new_in_memory();
    insert_triples(
        &db,
        &[
            ("http://ex/s1", "http://ex/cat", iri("http://ex/N")),
            ("http://ex/s1", "http://ex/amt", int_literal(100)),
            ("http://ex/s2", "http://ex/cat", iri("http://ex/N")),
            ("http://ex/s2", "http://ex/amt", int_literal(150)),
            ("http://ex/s3", "http://ex/cat", iri("http://ex/N")),
            ("http://ex/s3", "http://ex/amt", int_literal(200)),
            ("http://ex/s4", "http://ex/cat", iri("http://ex/S")),
            ("http://ex/s4", "http://ex/amt", int_literal(50)),
        ],
    );
    let session = db.session();
    let bgp = GraphPattern::Bgp(vec![TriplePattern::new(var("s"), iri("http://ex/cat"), var("cat")), TriplePattern::new(var("s"), iri("http://ex/amt"), var("amt"))]);
    let body = GraphPattern::Group { keys: vec![Expression::variable("cat")], aggregates: vec![(Variable::new("t"), AggregateExpression::Sum { expr: Box::new(Expression::variable("amt")), distinct: false })], inner: Box::new(bgp) };
    let form = QueryForm::Select { variables: SelectVariables::Explicit(vec![Variable::new("cat"), Variable::new("t")]), body };
    let outcome = session.query(&form, &QueryOptions::new()).unwrap();
    let QueryOutcome::Solutions(rows) = outcome else { panic!("expected Solutions") };
    assert_eq!(rows.len(), 2);
    let totals: std::collections::HashMap<_, _> = rows
        .iter()
        .map(|m| (m.get(&Variable::new("cat")).unwrap().clone(), m.get(&Variable::new("t")).unwrap().clone()))
        .collect();
    assert_eq!(totals.get(&Term::iri("http://ex/N")), Some(&Term::typed_literal("450", xsd::INTEGER)));
    assert_eq!(totals.get(&Term::iri("http://ex/S")), Some(&Term::typed_literal("50", xsd::INTEGER)));
}

#[test]
fn scenario_6_five_pattern_star_selects_leapfrog_in_the_cost_model() {
    let db = Database::new_in_memory();
    let session = db.session();
    let hub = "http://ex/hub";
    let properties = ["a", "b", "c", "d", "e"];
    let mut quads = Vec::new();
    for p in properties {
        quads.push(Quad::in_default_graph(Triple::new(NamedNode::new(hub), NamedNode::new(format!("http://ex/{p}")), Term::iri(format!("http://ex/{p}-val")))));
    }
    for i in 0..99 {
        quads.push(Quad::in_default_graph(Triple::new(NamedNode::new(format!("http://ex/other{i}")), NamedNode::new("http://ex/a"), Term::iri("http://ex/a-val"))));
    }
    session.update(&UpdateOperation::InsertData(quads)).unwrap();

    let triples: Vec<TriplePattern> = properties.iter().map(|p| TriplePattern::new(var("x"), iri(&format!("http://ex/{p}")), var(p))).collect();
    let strategy = sparql_engine::optimizer::choose_strategy(&triples, 100, 100);
    assert_eq!(strategy, sparql_engine::optimizer::JoinStrategy::Leapfrog);

    let body = GraphPattern::Bgp(triples);
    let form = QueryForm::Select { variables: SelectVariables::Explicit(vec![Variable::new("x")]), body };
    let outcome = session.query(&form, &QueryOptions::new()).unwrap();
    let QueryOutcome::Solutions(rows) = outcome else { panic!("expected Solutions") };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get(&Variable::new("x")), Some(&Term::iri(hub)));
}

#[test]
fn plan_cache_hits_repeated_queries_that_differ_only_in_variable_names() {
    let db = Database::new_in_memory();
    insert_triples(&db, &[("http://ex/a", "http://ex/p", iri("http://ex/b"))]);
    let session = db.session();
    for i in 0..20 {
        let body = GraphPattern::Bgp(vec![TriplePattern::new(var(&format!("s{i}")), iri("http://ex/p"), var(&format!("o{i}")))]);
        let form = QueryForm::Select { variables: SelectVariables::Explicit(vec![Variable::new(&format!("s{i}"))]), body };
        session.query(&form, &QueryOptions::new()).unwrap();
    }
}

#[test]
fn update_invalidates_only_the_cached_plan_touching_the_written_predicate() {
    let db = Database::new_in_memory();
    insert_triples(&db, &[("http://ex/a", "http://ex/p", iri("http://ex/p-val")), ("http://ex/a", "http://ex/q", iri("http://ex/q-val"))]);
    let session = db.session();

    let p_query = || QueryForm::Select {
        variables: SelectVariables::Explicit(vec![Variable::new("o")]),
        body: GraphPattern::Bgp(vec![TriplePattern::new(var("s"), iri("http://ex/p"), var("o"))]),
    };
    let q_query = || QueryForm::Select {
        variables: SelectVariables::Explicit(vec![Variable::new("o")]),
        body: GraphPattern::Bgp(vec![TriplePattern::new(var("s"), iri("http://ex/q"), var("o"))]),
    };

    session.query(&p_query(), &QueryOptions::new()).unwrap();
    session.query(&q_query(), &QueryOptions::new()).unwrap();

    session
        .update(&UpdateOperation::InsertData(vec![Quad::in_default_graph(Triple::new(NamedNode::new("http://ex/b"), NamedNode::new("http://ex/p"), Term::iri("http://ex/p-val2")))]))
        .unwrap();

    let p_explain = session.query(&p_query(), &QueryOptions::new().with_explain()).unwrap();
    let QueryOutcome::Explain(p_info) = p_explain else { panic!("expected Explain") };
    assert!(!p_info.cache_hit, "the write touched http://ex/p, so its cached plan must have been invalidated");

    let q_explain = session.query(&q_query(), &QueryOptions::new().with_explain()).unwrap();
    let QueryOutcome::Explain(q_info) = q_explain else { panic!("expected Explain") };
    assert!(q_info.cache_hit, "the write never touched http://ex/q, so its cached plan must survive");
}

#[test]
fn describe_returns_only_the_forward_cbd() {
    let db = Database::new_in_memory();
    insert_triples(&db, &[("http://ex/a", "http://ex/p", iri("http://ex/b")), ("http://ex/c", "http://ex/q", iri("http://ex/a"))]);
    let session = db.session();
    let form = QueryForm::Describe { target: DescribeTarget::Resources(vec![iri("http://ex/a")]), body: GraphPattern::empty_bgp() };
    let outcome = session.query(&form, &QueryOptions::new()).unwrap();
    let QueryOutcome::Graph(triples) = outcome else { panic!("expected Graph") };
    assert_eq!(triples.len(), 1);
    assert_eq!(triples[0].subject(), &sparql_model::Subject::NamedNode(NamedNode::new("http://ex/a")));
}

#[test]
fn clear_default_empties_the_store_and_construct_then_yields_nothing() {
    let db = Database::new_in_memory();
    insert_triples(&db, &[("http://ex/a", "http://ex/p", iri("http://ex/b"))]);
    let session = db.session();
    session.update(&UpdateOperation::Clear(GraphTarget::Default)).unwrap();
    assert_eq!(db.triple_count(), 0);
}
