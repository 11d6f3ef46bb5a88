use pretty_assertions::assert_eq;
use traceweave::graph::{build_graph, BuildOptions, LocationRegistry, NodeId, TraceGraph};
use traceweave::parser::{parse_document, CallType, TraceEvent};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn event(location: &str, name: &str, depth: u32) -> TraceEvent {
    TraceEvent {
        location: location.to_string(),
        name: name.to_string(),
        call_type: CallType::FunctionCall,
        depth,
        is_external: false,
        parent_location: None,
        parent_call: None,
        arguments: serde_json::Map::new(),
    }
}

fn nodes(graph: &TraceGraph) -> Vec<NodeId> {
    graph.node_ids().collect()
}

#[test]
fn three_level_stack_is_reconstructed_root_first() {
    init_logging();
    let events = vec![
        event("main.py:1", "main", 0),
        event("app.py:10", "run", 1),
        event("util.py:20", "helper", 2),
    ];
    let mut registry = LocationRegistry::new();
    let graph = build_graph(&mut registry, &events, &BuildOptions::default());

    let ids = nodes(&graph);
    let stack = graph.stack_trace(ids[2]);
    assert_eq!(stack, vec![ids[0], ids[1], ids[2]]);
    assert_eq!(stack.len(), graph.node(ids[2]).depth as usize + 1);
    assert_eq!(*stack.last().unwrap(), ids[2]);
    assert!(graph.warnings().is_empty());
    assert_eq!(graph.leaf_nodes(), &[ids[2]]);
}

#[test]
fn every_occurrence_lives_in_exactly_one_occurrence_list() {
    let events = vec![
        event("a.py:1", "main", 0),
        event("b.py:5", "helper", 1),
        event("a.py:1", "main", 0),
        event("b.py:5", "helper", 1),
        event("c.py:9", "tail", 1),
    ];
    let mut registry = LocationRegistry::new();
    let graph = build_graph(&mut registry, &events, &BuildOptions::default());

    let total: usize = registry.iter().map(|(_, loc)| loc.occurrences().len()).sum();
    assert_eq!(total, graph.len());
    for id in graph.node_ids() {
        assert!(graph.location(id).occurrences().contains(&id));
    }

    // down[] is exactly the inverse of up across the arena
    for id in graph.node_ids() {
        for &child in &graph.node(id).down {
            assert_eq!(graph.node(child).up, Some(id));
        }
        if let Some(up) = graph.node(id).up {
            assert!(graph.node(up).down.contains(&id));
        }
    }
}

#[test]
fn runtime_trace_is_chronological_and_reversal_idempotent() {
    let events = vec![
        event("a.py:1", "main", 0),
        event("b.py:5", "helper", 1),
        event("c.py:9", "inner", 2),
        event("a.py:3", "again", 0),
    ];
    let mut registry = LocationRegistry::new();
    let graph = build_graph(&mut registry, &events, &BuildOptions::default());

    let ids = nodes(&graph);
    let forward = graph.runtime_trace(ids[0]).to_vec();
    assert_eq!(forward, ids);

    let reversed: Vec<NodeId> = forward.iter().rev().copied().collect();
    let double_reversed: Vec<NodeId> = reversed.iter().rev().copied().collect();
    assert_eq!(double_reversed, forward);

    // past() walks prev links and returns the same chain root-first
    assert_eq!(graph.past(ids[3]), ids);
    assert_eq!(graph.root_of(ids[3]), ids[0]);
    assert_eq!(graph.top_frame(ids[2]), ids[0]);
}

#[test]
fn where_projection_shows_caller_lines_and_increments_leaf() {
    let mut main = event("main.py:1", "main", 0);
    main.parent_location = None;
    let mut run = event("app.py:10", "run", 1);
    run.parent_location = Some("main.py:3".to_string());
    run.parent_call = Some("run()".to_string());
    let mut helper = event("util.py:20", "helper", 2);
    helper.parent_location = Some("app.py:12".to_string());

    let mut registry = LocationRegistry::new();
    let graph = build_graph(&mut registry, &[main, run, helper], &BuildOptions::default());

    let ids = nodes(&graph);
    assert_eq!(
        graph.where_trace(ids[2]),
        vec![
            "main.py:3".to_string(),
            "app.py:12".to_string(),
            "util.py:21".to_string(),
        ]
    );

    // A single-frame stack shows only its own incremented location.
    assert_eq!(graph.where_trace(ids[0]), vec!["main.py:2".to_string()]);
}

#[test]
fn where_projection_collapses_import_machinery_frames() {
    let main = event("main.py:1", "main", 0);
    let mut module = event("pkg/__init__.py:1", "<module>", 1);
    module.parent_location = Some("<frozen importlib._bootstrap>:220".to_string());
    let mut inner = event("pkg/util.py:4", "setup", 2);
    inner.parent_location = Some("pkg/__init__.py:2".to_string());

    let mut registry = LocationRegistry::new();
    let graph = build_graph(&mut registry, &[main, module, inner], &BuildOptions::default());

    let ids = nodes(&graph);
    assert_eq!(
        graph.where_trace(ids[2]),
        vec![
            "<import_call>".to_string(),
            "pkg/__init__.py:2".to_string(),
            "pkg/util.py:5".to_string(),
        ]
    );
}

#[test]
fn depth_gap_yields_synthetic_root_and_warning() {
    init_logging();
    let events = vec![event("a.py:1", "main", 0), event("c.py:9", "orphan", 2)];
    let mut registry = LocationRegistry::new();
    let graph = build_graph(&mut registry, &events, &BuildOptions::default());

    let ids = nodes(&graph);
    assert_eq!(graph.node(ids[1]).up, None);
    assert_eq!(graph.stack_trace(ids[1]), vec![ids[1]]);
    assert!(graph.has_gaps());
    assert_eq!(graph.warnings()[0].location, "c.py:9");
}

#[test]
fn registry_is_reusable_after_clear_between_traces() {
    let mut registry = LocationRegistry::new();
    {
        let graph = build_graph(
            &mut registry,
            &[event("a.py:1", "main", 0), event("b.py:5", "helper", 1)],
            &BuildOptions::default(),
        );
        assert_eq!(graph.len(), 2);
    }

    registry.clear();
    let graph = build_graph(
        &mut registry,
        &[event("z.py:1", "other", 0)],
        &BuildOptions::default(),
    );
    assert_eq!(registry.len(), 1);
    assert_eq!(graph.len(), 1);
}

#[test]
fn builds_from_a_parsed_collector_document() {
    let doc = parse_document(&serde_json::json!({
        "metadata": {
            "original_command": "trace run.py",
            "scope_path": "/work/project",
            "timestamp": "2026-08-29T10:00:00"
        },
        "trace_data": [
            {
                "location": "run.py:3",
                "name": "<module>",
                "call_type": "module_execution",
                "depth": 0,
                "is_external": false,
                "parent_location": null,
                "parent_call": null,
                "arguments": {}
            },
            {
                "location": "run.py:12",
                "name": "main",
                "call_type": "function_call",
                "depth": 1,
                "parent_location": "run.py:30",
                "parent_call": "main()",
                "arguments": {"argv": ["--fast"]}
            }
        ]
    }))
    .unwrap();

    assert_eq!(doc.metadata["original_command"], "trace run.py");

    let mut registry = LocationRegistry::new();
    let graph = build_graph(&mut registry, &doc.trace_data, &BuildOptions::default());
    let ids = nodes(&graph);

    assert_eq!(graph.len(), 2);
    assert_eq!(graph.location(ids[0]).call_type(), CallType::ModuleExecution);
    assert_eq!(graph.node(ids[1]).arguments["argv"][0], "--fast");
    assert_eq!(graph.node(ids[1]).up, Some(ids[0]));
}

#[test]
fn external_packages_are_extracted_from_site_packages_paths() {
    let mut external = event(
        "/env/lib/python3.10/site-packages/lightning_utilities/core/rank_zero.py:28",
        "rank_zero_only",
        1,
    );
    external.is_external = true;
    let events = vec![event("a.py:1", "main", 0), external];

    let mut registry = LocationRegistry::new();
    let graph = build_graph(&mut registry, &events, &BuildOptions::default());

    let packages = graph.external_packages();
    assert!(packages.contains("lightning_utilities"));
    assert_eq!(packages.len(), 1);
}
