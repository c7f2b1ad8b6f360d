use rdf_loom_algebra::{
    Aggregate, Element, Expression, Query, QueryType, Solution, SortCondition,
    TabularData,
};
use rdf_loom_engine::{
    FederatingQueryProcessor, GraphQueryProcessor, QuadStoreQueryProcessor,
    QueryEvaluationError, QueryProcessor, ServiceExecutor,
};
use rdf_loom_model::vocab::xsd;
use rdf_loom_model::{LiteralNode, Node, Triple, UriNode};
use rdf_loom_storage::{Graph, GraphStore};

fn uri(iri: &str) -> Node {
    Node::Uri(UriNode::new(iri).unwrap())
}

fn integer(value: i64) -> Node {
    Node::Literal(LiteralNode::with_datatype(
        value.to_string(),
        UriNode::new(xsd::INTEGER).unwrap(),
    ))
}

fn spo_pattern(graph: &Graph) -> Triple {
    Triple::new(
        graph.create_variable_node("s"),
        graph.create_variable_node("p"),
        graph.create_variable_node("o"),
    )
}

// The shared test graph: 5 distinct triples (one assert is a duplicate).
fn create_graph() -> Graph {
    let mut graph = Graph::new();
    let s1 = graph.create_uri_node("http://test/s").unwrap();
    let s2 = graph.create_blank_node();
    let p1 = graph.create_uri_node("http://test/p1").unwrap();
    let p2 = graph.create_uri_node("http://test/p2").unwrap();
    let o1 = graph.create_uri_node("http://test/o").unwrap();
    let o2 = graph.create_literal_node("object");

    graph.assert(Triple::new(s1.clone(), p1.clone(), o1.clone())).unwrap();
    graph.assert(Triple::new(s1.clone(), p1.clone(), o2)).unwrap();
    graph.assert(Triple::new(s1.clone(), p2.clone(), o1.clone())).unwrap();
    graph.assert(Triple::new(s1.clone(), p2, o1.clone())).unwrap();
    graph.assert(Triple::new(s1, p1.clone(), s2.clone())).unwrap();
    graph.assert(Triple::new(s2, p1, o1)).unwrap();
    graph
}

#[test]
fn ask_with_empty_where_is_true() {
    let mut query = Query::new();
    query.query_type = QueryType::Ask;

    let result = GraphQueryProcessor::new(create_graph())
        .execute(&query)
        .unwrap();
    assert_eq!(result.as_boolean(), Some(true));
}

#[test]
fn ask_with_no_matches_is_false() {
    let graph = create_graph();
    let nothing = graph.create_uri_node("http://test/nosuchthing").unwrap();
    let mut query = Query::new();
    query.query_type = QueryType::Ask;
    query.where_clause = Some(Element::TripleBlock(vec![Triple::new(
        nothing.clone(),
        nothing.clone(),
        nothing,
    )]));

    let result = GraphQueryProcessor::new(graph).execute(&query).unwrap();
    assert_eq!(result.as_boolean(), Some(false));
}

#[test]
fn ask_with_any_match() {
    let graph = create_graph();
    let mut query = Query::new();
    query.query_type = QueryType::Ask;
    query.where_clause = Some(Element::TripleBlock(vec![spo_pattern(&graph)]));

    let result = GraphQueryProcessor::new(graph).execute(&query).unwrap();
    assert_eq!(result.as_boolean(), Some(true));
}

#[test]
fn ask_with_concrete_match() {
    let graph = create_graph();
    let concrete = Triple::new(
        graph.create_uri_node("http://test/s").unwrap(),
        graph.create_uri_node("http://test/p1").unwrap(),
        graph.create_uri_node("http://test/o").unwrap(),
    );
    assert!(graph.contains(&concrete));
    let mut query = Query::new();
    query.query_type = QueryType::Ask;
    query.where_clause = Some(Element::TripleBlock(vec![concrete]));

    let result = GraphQueryProcessor::new(graph).execute(&query).unwrap();
    assert_eq!(result.as_boolean(), Some(true));
}

#[test]
fn select_with_empty_where_has_one_empty_row() {
    let query = Query::new();
    let result = GraphQueryProcessor::new(create_graph())
        .execute(&query)
        .unwrap();
    let results = result.as_tabular().unwrap();
    assert_eq!(results.len(), 1);
    assert!(results.row(0).unwrap().is_empty());
}

#[test]
fn select_with_no_matches_is_empty() {
    let graph = create_graph();
    let nothing = graph.create_uri_node("http://test/nosuchthing").unwrap();
    let mut query = Query::new();
    query.where_clause = Some(Element::TripleBlock(vec![Triple::new(
        nothing.clone(),
        nothing.clone(),
        nothing,
    )]));

    let result = GraphQueryProcessor::new(graph).execute(&query).unwrap();
    assert_eq!(result.as_tabular().unwrap().len(), 0);
}

#[test]
fn select_all_binds_every_variable() {
    let graph = create_graph();
    let expected = graph.count();
    let mut query = Query::new();
    query.where_clause = Some(Element::TripleBlock(vec![spo_pattern(&graph)]));

    let result = GraphQueryProcessor::new(graph).execute(&query).unwrap();
    let results = result.as_tabular().unwrap();
    assert_eq!(results.len(), expected);
    assert!(results.rows().all(|row| {
        row.has_bound_value("s") && row.has_bound_value("p") && row.has_bound_value("o")
    }));
}

#[test]
fn select_with_concrete_match_has_one_empty_row() {
    let graph = create_graph();
    let concrete = Triple::new(
        graph.create_uri_node("http://test/s").unwrap(),
        graph.create_uri_node("http://test/p1").unwrap(),
        graph.create_uri_node("http://test/o").unwrap(),
    );
    let mut query = Query::new();
    query.where_clause = Some(Element::TripleBlock(vec![concrete]));

    let result = GraphQueryProcessor::new(graph).execute(&query).unwrap();
    let results = result.as_tabular().unwrap();
    assert_eq!(results.len(), 1);
    assert!(results.row(0).unwrap().is_empty());
}

#[test]
fn projection_restricts_to_declared_variables() {
    let mut query = Query::new();
    query.query_type = QueryType::Select;
    query.add_project_variable("x");
    query.where_clause = Some(Element::Data(TabularData::new(
        vec!["x".to_owned(), "y".to_owned()],
        vec![Solution::new()
            .bind("x", integer(10))
            .bind("y", integer(100))],
    )));

    let result = GraphQueryProcessor::new(Graph::new()).execute(&query).unwrap();
    let results = result.as_tabular().unwrap();
    assert_eq!(results.variables(), ["x".to_owned()]);
    assert_eq!(results.len(), 1);
    let row = results.row(0).unwrap();
    assert!(row.has_bound_value("x"));
    assert_eq!(row.get("x"), Some(&integer(10)));
    assert!(!row.has_bound_value("y"));
}

#[test]
fn projection_keeps_partially_bound_rows() {
    let mut query = Query::new();
    query.query_type = QueryType::Select;
    query.add_project_variable("x");
    query.where_clause = Some(Element::Data(TabularData::new(
        vec!["x".to_owned(), "y".to_owned()],
        vec![
            Solution::new().bind("x", integer(10)).bind("y", integer(100)),
            Solution::new().bind("x", integer(10)),
            Solution::new().bind("y", integer(100)),
            Solution::new(),
        ],
    )));

    let result = GraphQueryProcessor::new(Graph::new()).execute(&query).unwrap();
    let results = result.as_tabular().unwrap();
    assert_eq!(results.len(), 4);
    for row in results.rows() {
        assert!(row.has_value("x"));
        if row.has_bound_value("x") {
            assert_eq!(row.get("x"), Some(&integer(10)));
        }
    }
}

#[test]
fn order_by_ascending_and_descending() {
    let data = TabularData::new(
        vec!["x".to_owned()],
        vec![
            Solution::new().bind("x", integer(10)),
            Solution::new().bind("x", integer(100)),
        ],
    );

    let mut query = Query::new();
    query.query_type = QueryType::Select;
    query.sort_conditions = vec![SortCondition::ascending(Expression::variable("x"))];
    query.where_clause = Some(Element::Data(data.clone()));

    let result = GraphQueryProcessor::new(Graph::new()).execute(&query).unwrap();
    let results = result.as_tabular().unwrap();
    assert_eq!(results.row(0).unwrap().get("x"), Some(&integer(10)));
    assert_eq!(results.row(1).unwrap().get("x"), Some(&integer(100)));

    let mut query = Query::new();
    query.query_type = QueryType::Select;
    query.sort_conditions = vec![SortCondition::descending(Expression::variable("x"))];
    query.where_clause = Some(Element::Data(data));

    let result = GraphQueryProcessor::new(Graph::new()).execute(&query).unwrap();
    let results = result.as_tabular().unwrap();
    assert_eq!(results.row(0).unwrap().get("x"), Some(&integer(100)));
    assert_eq!(results.row(1).unwrap().get("x"), Some(&integer(10)));
}

// Group over x: the x=10 group has two rows, the unbound-x group has two.
fn grouping_data() -> TabularData {
    TabularData::new(
        vec!["x".to_owned(), "y".to_owned()],
        vec![
            Solution::new().bind("x", integer(10)).bind("y", integer(100)),
            Solution::new().bind("x", integer(10)),
            Solution::new().bind("y", integer(100)),
            Solution::new(),
        ],
    )
}

#[test]
fn group_by_counts_per_group() {
    let mut query = Query::new();
    query.query_type = QueryType::Select;
    query.add_project_variable("x");
    query.add_project_expression(
        "count",
        Expression::Aggregate(Box::new(Aggregate::CountAll { distinct: false })),
    );
    query
        .group_expressions
        .push((Expression::variable("x"), Some("x".to_owned())));
    query.where_clause = Some(Element::Data(grouping_data()));

    let result = GraphQueryProcessor::new(Graph::new()).execute(&query).unwrap();
    let results = result.as_tabular().unwrap();
    assert_eq!(results.len(), 2);
    for row in results.rows() {
        if row.has_bound_value("x") {
            assert_eq!(row.get("x"), Some(&integer(10)));
        }
        assert!(row.has_bound_value("count"));
        assert_eq!(row.get("count"), Some(&integer(2)));
    }
}

#[test]
fn group_by_sample_picks_a_group_member() {
    let mut query = Query::new();
    query.query_type = QueryType::Select;
    query.add_project_variable("x");
    query.add_project_expression(
        "sample",
        Expression::Aggregate(Box::new(Aggregate::Sample {
            expression: Box::new(Expression::variable("y")),
        })),
    );
    query
        .group_expressions
        .push((Expression::variable("x"), Some("x".to_owned())));
    query.where_clause = Some(Element::Data(grouping_data()));

    let result = GraphQueryProcessor::new(Graph::new()).execute(&query).unwrap();
    let results = result.as_tabular().unwrap();
    assert_eq!(results.len(), 2);
    for row in results.rows() {
        assert!(row.has_value("sample"));
        if row.has_bound_value("sample") {
            assert_eq!(row.get("sample"), Some(&integer(100)));
        }
    }
}

#[test]
fn count_star_over_empty_where_is_one() {
    // SELECT (COUNT(*) AS ?c) WHERE {}: the unit table contributes one
    // solution, grouped into a single group of size 1
    let mut query = Query::new();
    query.query_type = QueryType::Select;
    query.add_project_expression(
        "c",
        Expression::Aggregate(Box::new(Aggregate::CountAll { distinct: false })),
    );

    let result = GraphQueryProcessor::new(Graph::new()).execute(&query).unwrap();
    let results = result.as_tabular().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results.row(0).unwrap().get("c"), Some(&integer(1)));
}

#[test]
fn count_star_over_no_matches_is_zero() {
    let graph = create_graph();
    let nothing = graph.create_uri_node("http://test/nosuchthing").unwrap();
    let mut query = Query::new();
    query.query_type = QueryType::Select;
    query.add_project_expression(
        "c",
        Expression::Aggregate(Box::new(Aggregate::CountAll { distinct: false })),
    );
    query.where_clause = Some(Element::TripleBlock(vec![Triple::new(
        nothing.clone(),
        nothing.clone(),
        nothing,
    )]));

    let result = GraphQueryProcessor::new(graph).execute(&query).unwrap();
    let results = result.as_tabular().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results.row(0).unwrap().get("c"), Some(&integer(0)));
}

#[test]
fn optional_keeps_unmatched_rows() {
    let graph = create_graph();
    let p1 = graph.create_uri_node("http://test/p1").unwrap();
    let p2 = graph.create_uri_node("http://test/p2").unwrap();
    let mut query = Query::new();
    query.where_clause = Some(Element::Group(vec![
        Element::TripleBlock(vec![Triple::new(
            graph.create_variable_node("s"),
            p1,
            graph.create_variable_node("o"),
        )]),
        Element::Optional(Box::new(Element::TripleBlock(vec![Triple::new(
            graph.create_variable_node("o"),
            p2,
            graph.create_variable_node("extra"),
        )]))),
    ]));

    let result = GraphQueryProcessor::new(graph).execute(&query).unwrap();
    let results = result.as_tabular().unwrap();
    // every ?s p1 ?o row survives the optional part
    assert_eq!(results.len(), 4);
}

#[test]
fn union_concatenates_without_deduplication() {
    let graph = create_graph();
    let block = Element::TripleBlock(vec![spo_pattern(&graph)]);
    let expected = graph.count() * 2;
    let mut query = Query::new();
    query.where_clause = Some(Element::Union(vec![block.clone(), block]));

    let result = GraphQueryProcessor::new(graph).execute(&query).unwrap();
    assert_eq!(result.as_tabular().unwrap().len(), expected);
}

#[test]
fn distinct_removes_duplicate_solutions() {
    let graph = create_graph();
    let block = Element::TripleBlock(vec![spo_pattern(&graph)]);
    let expected = graph.count();
    let mut query = Query::new();
    query.query_type = QueryType::SelectAllDistinct;
    query.where_clause = Some(Element::Union(vec![block.clone(), block]));

    let result = GraphQueryProcessor::new(graph).execute(&query).unwrap();
    assert_eq!(result.as_tabular().unwrap().len(), expected);
}

#[test]
fn limit_and_offset_slice_results() {
    let graph = create_graph();
    let total = graph.count();
    let block = Element::TripleBlock(vec![spo_pattern(&graph)]);

    let mut query = Query::new();
    query.where_clause = Some(block.clone());
    query.limit = 2;
    let result = GraphQueryProcessor::new(create_graph()).execute(&query).unwrap();
    assert_eq!(result.as_tabular().unwrap().len(), 2);

    let mut query = Query::new();
    query.where_clause = Some(block.clone());
    query.limit = 0;
    let result = GraphQueryProcessor::new(create_graph()).execute(&query).unwrap();
    assert_eq!(result.as_tabular().unwrap().len(), 0);

    let mut query = Query::new();
    query.where_clause = Some(block);
    query.offset = 2;
    let result = GraphQueryProcessor::new(graph).execute(&query).unwrap();
    assert_eq!(result.as_tabular().unwrap().len(), total - 2);
}

#[test]
fn filter_excludes_error_rows_without_failing() {
    let graph = create_graph();
    // ?o + 1 errors for URI and plain-literal objects; the query still
    // completes with zero matching rows instead of failing
    let mut query = Query::new();
    query.where_clause = Some(Element::Group(vec![
        Element::TripleBlock(vec![spo_pattern(&graph)]),
        Element::Filter(vec![Expression::GreaterThan(
            Box::new(Expression::Add(
                Box::new(Expression::variable("o")),
                Box::new(Expression::Constant(integer(1))),
            )),
            Box::new(Expression::Constant(integer(0))),
        )]),
    ]));

    let result = GraphQueryProcessor::new(graph).execute(&query).unwrap();
    assert_eq!(result.as_tabular().unwrap().len(), 0);
}

#[test]
fn values_clause_restricts_where_results() {
    let graph = create_graph();
    let o1 = graph.create_uri_node("http://test/o").unwrap();
    let p1 = graph.create_uri_node("http://test/p1").unwrap();
    let mut query = Query::new();
    query.where_clause = Some(Element::TripleBlock(vec![Triple::new(
        graph.create_variable_node("s"),
        p1,
        graph.create_variable_node("o"),
    )]));
    query.values_clause = Some(TabularData::new(
        vec!["o".to_owned()],
        vec![Solution::new().bind("o", o1)],
    ));

    let result = GraphQueryProcessor::new(graph).execute(&query).unwrap();
    // of the four ?s p1 ?o rows only those with o = <http://test/o> remain
    assert_eq!(result.as_tabular().unwrap().len(), 2);
}

#[test]
fn quad_store_processor_reads_the_default_graph() {
    let mut store = GraphStore::new();
    let graph = create_graph();
    let triples: Vec<Triple> = graph.triples().cloned().collect();
    store.default_graph_mut().assert_all(triples).unwrap();
    let expected = store.default_graph().count();

    let processor = QuadStoreQueryProcessor::new(store);
    let mut query = Query::new();
    query.where_clause = Some(Element::TripleBlock(vec![Triple::new(
        processor.store().default_graph().create_variable_node("s"),
        processor.store().default_graph().create_variable_node("p"),
        processor.store().default_graph().create_variable_node("o"),
    )]));

    let result = processor.execute(&query).unwrap();
    assert_eq!(result.as_tabular().unwrap().len(), expected);
}

#[test]
fn property_path_query_reaches_transitively() {
    use rdf_loom_algebra::{PathExpr, TriplePath};

    let mut graph = Graph::new();
    let knows = graph.create_uri_node("http://test/knows").unwrap();
    let a = graph.create_uri_node("http://test/a").unwrap();
    let b = graph.create_uri_node("http://test/b").unwrap();
    let c = graph.create_uri_node("http://test/c").unwrap();
    graph.assert(Triple::new(a.clone(), knows.clone(), b.clone())).unwrap();
    graph.assert(Triple::new(b, knows.clone(), c.clone())).unwrap();

    let mut query = Query::new();
    query.query_type = QueryType::Select;
    query.add_project_variable("o");
    query.where_clause = Some(Element::PathBlock(vec![TriplePath::new(
        a,
        PathExpr::OneOrMore(Box::new(PathExpr::Predicate(knows))),
        graph.create_variable_node("o"),
    )]));

    let result = GraphQueryProcessor::new(graph).execute(&query).unwrap();
    let results = result.as_tabular().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results.rows().any(|row| row.get("o") == Some(&c)));
}

struct FixedServiceExecutor {
    rows: Vec<Solution>,
}

impl ServiceExecutor for FixedServiceExecutor {
    fn execute(
        &self,
        _endpoint: &UriNode,
        _inner: &rdf_loom_algebra::Algebra,
    ) -> Result<Vec<Solution>, QueryEvaluationError> {
        Ok(self.rows.clone())
    }
}

#[test]
fn service_delegates_to_the_registered_executor() {
    let executor = FixedServiceExecutor {
        rows: vec![Solution::new().bind("x", integer(42))],
    };
    let processor =
        FederatingQueryProcessor::new(Graph::new(), Box::new(executor));

    let mut query = Query::new();
    query.where_clause = Some(Element::Service {
        inner: Box::new(Element::TripleBlock(Vec::new())),
        endpoint: UriNode::new("http://example.org/sparql").unwrap(),
        silent: false,
    });

    let result = processor.execute(&query).unwrap();
    let results = result.as_tabular().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results.row(0).unwrap().get("x"), Some(&integer(42)));
}

#[test]
fn service_without_executor_fails_unless_silent() {
    let mut query = Query::new();
    query.where_clause = Some(Element::Service {
        inner: Box::new(Element::TripleBlock(Vec::new())),
        endpoint: UriNode::new("http://example.org/sparql").unwrap(),
        silent: false,
    });
    let error = GraphQueryProcessor::new(Graph::new()).execute(&query);
    assert!(matches!(
        error,
        Err(QueryEvaluationError::ServiceUnavailable(_))
    ));

    if let Some(Element::Service { silent, .. }) = query.where_clause.as_mut() {
        *silent = true;
    }
    let result = GraphQueryProcessor::new(Graph::new()).execute(&query).unwrap();
    assert_eq!(result.as_tabular().unwrap().len(), 0);
}
