//! End-to-end pipeline: spec file + capture file in, exported banks and
//! DOT graph out, byte-identical across repeated runs.

use graph_snapshot::config::Config;
use graph_snapshot::graph::Graph;
use graph_snapshot::model::QualifiedName;
use graph_snapshot::{export, live, reconcile, spec};
use pretty_assertions::assert_eq;
use std::fs;

const SPEC_YAML: &str = r#"
packages:
  - name: demo
    version: "1.2.0"
    nodes: ["/talker", "/listener", "/fib_server"]
nodes:
  - name: /talker
    package: demo
    publishes:
      - { name: /chatter, construct_type: std_msgs/String }
  - name: /listener
    package: demo
    subscribes:
      - { name: /chatter, construct_type: std_msgs/String }
  - name: /fib_server
    package: demo
    subscribes:
      - { name: /fibonacci/goal, construct_type: demo/FibonacciActionGoal }
    publishes:
      - { name: /fibonacci/feedback, construct_type: demo/FibonacciActionFeedback }
      - { name: /fibonacci/result, construct_type: demo/FibonacciActionResult }
    action_servers: ["/fibonacci"]
messages:
  - name: std_msgs/String
    fields:
      - { name: data, construct_type: string }
"#;

const LIVE_JSON: &str = r#"{
  "nodes": [
    {
      "name": "/talker",
      "topics": [
        { "name": "/chatter", "construct_type": "std_msgs/String", "role": "publish" }
      ],
      "candidate_processes": [
        { "pid": 41, "cmdline": ["/opt/ws/lib/demo/talker"], "reason": "exe-path-hint" }
      ]
    },
    {
      "name": "listener_node_881",
      "topics": [
        { "name": "/chatter", "construct_type": "std_msgs/String", "role": "subscribe" }
      ],
      "candidate_processes": [
        { "pid": 42, "cmdline": ["/usr/bin/python3", "/opt/ws/lib/demo/listener.py"] }
      ]
    },
    {
      "name": "/fib_server",
      "topics": [
        { "name": "/fibonacci/goal", "construct_type": "demo/FibonacciActionGoal", "role": "subscribe" },
        { "name": "/fibonacci/feedback", "construct_type": "demo/FibonacciActionFeedback", "role": "publish" },
        { "name": "/fibonacci/result", "construct_type": "demo/FibonacciActionResult", "role": "publish" }
      ],
      "actions": [
        { "name": "/fibonacci", "role": "server" }
      ]
    }
  ]
}"#;

#[test]
fn files_in_files_out() {
    let dir = tempfile::tempdir().unwrap();
    let spec_path = dir.path().join("workspace.yaml");
    let live_path = dir.path().join("capture.json");
    fs::write(&spec_path, SPEC_YAML).unwrap();
    fs::write(&live_path, LIVE_JSON).unwrap();

    let static_spec = spec::load(spec_path.to_str().unwrap()).unwrap();
    let capture = live::load(live_path.to_str().unwrap()).unwrap();
    let cfg = Config::default();

    let model = reconcile::reconcile(&static_spec, &capture, &cfg).unwrap();

    // Exact, fuzzy, and action-hosting nodes all validate.
    assert!(model.nodes.values().all(|n| n.validated));
    // The fuzzy-matched listener keeps its declared name and gains its
    // interpreter-hosted process.
    let listener = model.node(&QualifiedName::new("/listener")).unwrap();
    assert_eq!(listener.process.as_ref().map(|p| p.pid), Some(42));

    // Partial fibonacci action: flagged, typed, with the server role.
    let action = model.action("/fibonacci").unwrap();
    assert!(action.is_partial());
    assert_eq!(action.construct_type.as_deref(), Some("demo/FibonacciAction"));
    assert!(action.servers.contains(&QualifiedName::new("/fib_server")));

    let graph = Graph::build(&model);
    // One chatter topic edge, one grouped fibonacci edge; the three
    // member topics never stand alone.
    assert_eq!(graph.edges.len(), 2);

    let out_dir = dir.path().join("out");
    let out = out_dir.to_str().unwrap();
    let written = export::write_model(
        &model,
        out,
        "snapshot",
        &[export::Format::Yaml, export::Format::Json, export::Format::Text],
    )
    .unwrap();
    assert!(!written.is_empty());
    export::write_graph_dot(&graph, out, "snapshot").unwrap();

    for file in [
        "snapshot_nodes.yaml",
        "snapshot_topics.yaml",
        "snapshot_actions.yaml",
        "snapshot_nodes.json",
        "snapshot_model.txt",
        "snapshot_graph.dot",
    ] {
        assert!(out_dir.join(file).exists(), "missing {file}");
    }

    let dot = fs::read_to_string(out_dir.join("snapshot_graph.dot")).unwrap();
    assert!(dot.contains("\"action-/fibonacci\""));
    assert!(!dot.contains("\"topic-/fibonacci/goal\""));

    // Re-running the whole pipeline reproduces the exports byte for byte.
    let first_nodes = fs::read_to_string(out_dir.join("snapshot_nodes.yaml")).unwrap();
    let first_dot = dot.clone();
    let model_again = reconcile::reconcile(&static_spec, &capture, &cfg).unwrap();
    export::write_model(&model_again, out, "snapshot", &[export::Format::Yaml]).unwrap();
    export::write_graph_dot(&Graph::build(&model_again), out, "snapshot").unwrap();
    assert_eq!(
        fs::read_to_string(out_dir.join("snapshot_nodes.yaml")).unwrap(),
        first_nodes
    );
    assert_eq!(
        fs::read_to_string(out_dir.join("snapshot_graph.dot")).unwrap(),
        first_dot
    );
}
