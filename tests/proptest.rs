use proptest::prelude::*;
use resgraph::fetch::InMemoryFetcher;
use resgraph::graph::{dependants, dependencies, plan_removal, resolve};
use resgraph::resource::{DependencyScope, ResourceHolder, ResourceType};
use resgraph::DependencyGraph;
use std::collections::BTreeSet;

fn uri(i: usize) -> String {
    format!("urn:res_{i}.xsd")
}

fn build_graph_from_edges(edges: &[(usize, usize)], max_nodes: usize) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for i in 0..max_nodes {
        graph.insert(ResourceHolder::resolved(
            uri(i),
            ResourceType::Schema,
            "",
            format!("<res_{i}/>").into_bytes(),
        ));
    }
    for &(from, to) in edges {
        if from < max_nodes && to < max_nodes {
            graph.add_dependency(&uri(from), &uri(to)).unwrap();
        }
    }
    graph
}

fn all_of(graph: &DependencyGraph, id: &str) -> BTreeSet<String> {
    dependencies(graph, DependencyScope::All, id)
        .unwrap()
        .iter()
        .map(|s| s.uri().to_string())
        .collect()
}

fn schema_importing(targets: &BTreeSet<usize>) -> String {
    let body: String = targets
        .iter()
        .map(|&t| format!(r#"<xs:include schemaLocation="{}"/>"#, uri(t)))
        .collect();
    format!(r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">{body}</xs:schema>"#)
}

proptest! {
    #[test]
    fn all_dependencies_are_transitive(
        edges in prop::collection::vec((0usize..20, 0usize..20), 0..60)
    ) {
        let graph = build_graph_from_edges(&edges, 20);
        for x in 0..20 {
            let reach_x = all_of(&graph, &uri(x));
            for y in &reach_x {
                for z in all_of(&graph, y) {
                    if z != uri(x) {
                        prop_assert!(reach_x.contains(&z), "{} reaches {} via {}", uri(x), z, y);
                    }
                }
            }
        }
    }

    #[test]
    fn direct_is_subset_of_all(
        edges in prop::collection::vec((0usize..20, 0usize..20), 0..60)
    ) {
        let graph = build_graph_from_edges(&edges, 20);
        for i in 0..20 {
            let id = uri(i);
            let direct = dependencies(&graph, DependencyScope::Direct, &id).unwrap();
            let all = dependencies(&graph, DependencyScope::All, &id).unwrap();
            prop_assert!(direct.is_subset(&all));

            let direct = dependants(&graph, DependencyScope::Direct, &id).unwrap();
            let all = dependants(&graph, DependencyScope::All, &id).unwrap();
            prop_assert!(direct.is_subset(&all));
            prop_assert!(all.iter().all(|s| s.uri() != id));
        }
    }

    #[test]
    fn dependants_are_the_transpose(
        edges in prop::collection::vec((0usize..20, 0usize..20), 0..60)
    ) {
        let graph = build_graph_from_edges(&edges, 20);
        for i in 0..20 {
            let x = uri(i);
            for y in graph.dependencies_of(&x) {
                prop_assert!(graph.dependants_of(y).contains(x.as_str()));
            }
            for y in graph.dependants_of(&x) {
                prop_assert!(graph.dependencies_of(y).contains(x.as_str()));
            }
        }
    }

    #[test]
    fn removal_is_idempotent_and_leaves_no_stale_edges(
        edges in prop::collection::vec((0usize..20, 0usize..20), 0..60),
        selected in prop::collection::btree_set(0usize..20, 1..4)
    ) {
        let mut graph = build_graph_from_edges(&edges, 20);
        let selected: Vec<String> = selected.into_iter().map(uri).collect();
        let plan = plan_removal(&graph, &selected).unwrap();

        for id in plan.collateral() {
            prop_assert!(!plan.direct().contains(id));
        }

        plan.apply(&mut graph);
        let once: Vec<(String, String)> = graph
            .edges()
            .into_iter()
            .map(|(f, t)| (f.to_string(), t.to_string()))
            .collect();
        let len = graph.len();

        prop_assert!(plan.apply(&mut graph).is_empty());
        prop_assert_eq!(graph.len(), len);
        prop_assert_eq!(graph.edges().len(), once.len());
        prop_assert!(plan.iter().all(|id| !graph.contains(id)));
        prop_assert!(graph.check_invariants().is_ok());
    }

    #[test]
    fn resolve_reaches_exactly_the_reachable_set(
        edges in prop::collection::vec((0usize..15, 0usize..15), 0..40)
    ) {
        let mut fetcher = InMemoryFetcher::new();
        for i in 0..15 {
            let targets: BTreeSet<usize> = edges
                .iter()
                .filter(|&&(from, to)| from == i && to != i)
                .map(|&(_, to)| to)
                .collect();
            fetcher.insert(uri(i), schema_importing(&targets));
        }
        let resolved = resolve([uri(0)], &fetcher).unwrap();

        let expected = build_graph_from_edges(
            &edges.iter().copied().filter(|(f, t)| f != t).collect::<Vec<_>>(),
            15,
        );
        let mut reachable = all_of(&expected, &uri(0));
        reachable.insert(uri(0));

        let ids: BTreeSet<String> = resolved.holders().map(|h| h.system_id().to_string()).collect();
        prop_assert_eq!(ids, reachable);
        prop_assert!(resolved.check_invariants().is_ok());
    }
}
