//! Tests for SpanAnnotationGraph functionality

use super::*;
use crate::{
    config::{AcyclicityPolicy, GraphConfig, LabelCollisionPolicy},
    error::{SpanGraphError, SpanMiss},
    label::{ImmutableSpanTextLabel, MutableSpanTextLabel, SpanTextLabel},
    properties::{AttrValue, Attributes, NodeId},
    tests::helpers::{
        create_argument_graph, create_claim_evidence_graph, create_test_label, init_logging,
        relations, span,
    },
};
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::Arc,
};
use test_log::test;

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn test_claim_evidence_scenario() {
    let graph = create_claim_evidence_graph();
    let claim = create_test_label(0, 5, "claim");
    let evidence = create_test_label(6, 10, "evidence");

    assert_eq!(graph.get(NodeId::new(0)).unwrap(), &claim);
    assert_eq!(graph.get(NodeId::new(1)).unwrap(), &evidence);
    assert_eq!(graph.relation_target_of(&claim).unwrap(), Some(&evidence));
    assert_eq!(graph.relation_target_of(&evidence).unwrap(), None);

    let labels = graph.labels_at(&span(0, 5)).unwrap();
    assert_eq!(labels.len(), 1);
    assert_eq!(labels["claim"], &claim);
}

#[test]
fn test_id_round_trip_through_registry() {
    let graph = create_argument_graph();
    for index in 0..graph.len() {
        let id = NodeId::new(index);
        let node = graph.get(id).unwrap();
        assert_eq!(graph.id_of(node), Some(id));
    }
    assert_eq!(
        graph.get(NodeId::new(graph.len())),
        Err(SpanGraphError::IndexOutOfRange { id: 5, len: 5 })
    );
}

#[test]
fn test_relation_targets_follow_table() {
    let graph = create_argument_graph();
    for (id, node) in graph.iter() {
        let expected = graph.relations().target(id).unwrap();
        let actual = graph.relation_target_of(node).unwrap();
        match expected {
            Some(target) => assert_eq!(actual, Some(graph.get(target).unwrap())),
            None => assert_eq!(actual, None),
        }
    }
}

#[test]
fn test_unregistered_node_is_an_error_not_absence() {
    let graph = create_claim_evidence_graph();
    let stranger = create_test_label(0, 5, "premise");

    assert_eq!(graph.id_of(&stranger), None);
    assert!(!graph.contains(&stranger));
    assert!(matches!(
        graph.relation_target_of(&stranger),
        Err(SpanGraphError::NodeNotInGraph(_))
    ));
    assert!(matches!(
        graph.relation_chain(&stranger),
        Err(SpanGraphError::NodeNotInGraph(_))
    ));
}

#[test]
fn test_covered_text_does_not_affect_lookup() {
    let graph = create_claim_evidence_graph();
    let retokenized = create_test_label(0, 5, "claim").with_covered_text("Taxes");
    assert_eq!(graph.id_of(&retokenized), Some(NodeId::new(0)));
}

#[test]
fn test_labels_at_returns_every_label_dimension() {
    let graph = create_argument_graph();
    let labels = graph.labels_at(&span(0, 11)).unwrap();
    let names: Vec<&str> = labels.keys().copied().collect();
    assert_eq!(names, vec!["claim", "stance"]);
    for (label, node) in labels {
        assert_eq!(node.label(), label);
        assert_eq!(node.span(), span(0, 11));
    }

    assert_eq!(
        graph.labels_at(&span(1, 11)),
        Err(SpanGraphError::SpanNotIndexed {
            span: span(1, 11),
            miss: SpanMiss::Begin
        })
    );
    let err = graph.labels_at(&span(0, 12)).unwrap_err();
    assert!(err.is_recoverable());
    assert_eq!(
        err,
        SpanGraphError::SpanNotIndexed {
            span: span(0, 12),
            miss: SpanMiss::End
        }
    );
}

#[test]
fn test_relation_chain_and_sources() {
    let graph = create_argument_graph();
    let start = graph.get(NodeId::new(0)).unwrap().clone();
    let chain: Vec<NodeId> = graph
        .relation_chain(&start)
        .unwrap()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(chain, vec![NodeId::new(1), NodeId::new(2)]);

    let claim = graph.get(NodeId::new(2)).unwrap().clone();
    assert_eq!(graph.relation_chain(&claim).unwrap().count(), 0);

    let sources: Vec<&str> = graph
        .relation_sources_of(&claim)
        .unwrap()
        .into_iter()
        .map(|node| node.label())
        .collect();
    assert_eq!(sources, vec!["premise", "evidence"]);
}

#[test]
fn test_relation_chain_terminates_on_cycle() {
    init_logging();
    let nodes = vec![
        create_test_label(0, 1, "a"),
        create_test_label(1, 2, "b"),
        create_test_label(2, 3, "c"),
    ];
    let graph = SpanAnnotationGraph::new(nodes, relations(&[1, 2, 0])).unwrap();
    assert!(graph.find_cycle().is_some());

    let start = graph.get(NodeId::new(0)).unwrap().clone();
    let visited: Vec<NodeId> = graph
        .relation_chain(&start)
        .unwrap()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(visited, vec![NodeId::new(1), NodeId::new(2)]);
}

#[test]
fn test_acyclicity_policy() {
    init_logging();
    let nodes = || vec![create_test_label(0, 1, "a"), create_test_label(1, 2, "b")];
    let config = GraphConfig {
        acyclicity: AcyclicityPolicy::Reject,
        ..Default::default()
    };

    assert!(SpanAnnotationGraph::new(nodes(), relations(&[1, 0])).is_ok());
    assert!(matches!(
        SpanAnnotationGraph::with_config(nodes(), relations(&[1, 0]), &config),
        Err(SpanGraphError::RelationCycle { .. })
    ));
    assert!(SpanAnnotationGraph::with_config(nodes(), relations(&[1, -1]), &config).is_ok());
}

#[test]
fn test_construction_rejects_bad_inputs() {
    init_logging();
    let duplicate = vec![
        create_test_label(0, 5, "claim"),
        create_test_label(0, 5, "claim").with_covered_text("other text"),
    ];
    assert_eq!(
        SpanAnnotationGraph::new(duplicate, relations(&[-1, -1])),
        Err(SpanGraphError::DuplicateValue {
            first: 0,
            duplicate: 1
        })
    );

    let nodes = vec![create_test_label(0, 5, "claim"), create_test_label(6, 10, "evidence")];
    assert_eq!(
        SpanAnnotationGraph::new(nodes.clone(), relations(&[1])),
        Err(SpanGraphError::RelationTableSizeMismatch {
            nodes: 2,
            relations: 1
        })
    );
    assert_eq!(
        SpanAnnotationGraph::new(nodes, relations(&[5, -1])),
        Err(SpanGraphError::InvalidRelationTarget {
            node: 0,
            target: 5,
            len: 2
        })
    );
}

#[test]
fn test_label_collision_policy_applies_to_graph() {
    init_logging();
    let mut attrs = Attributes::new();
    attrs.insert("annotator".to_string(), AttrValue::from("b"));
    let nodes = vec![
        create_test_label(0, 5, "claim"),
        MutableSpanTextLabel::new(span(0, 5), "claim", Some(attrs)),
    ];
    let graph = SpanAnnotationGraph::new(nodes.clone(), relations(&[-1, -1])).unwrap();
    assert_eq!(graph.labels_at(&span(0, 5)).unwrap()["claim"], &nodes[1]);

    let config = GraphConfig {
        label_collision: LabelCollisionPolicy::Reject,
        ..Default::default()
    };
    assert!(matches!(
        SpanAnnotationGraph::with_config(nodes, relations(&[-1, -1]), &config),
        Err(SpanGraphError::SpanLabelCollision { .. })
    ));
}

#[test]
fn test_prebuilt_span_index_must_agree() {
    let graph = create_claim_evidence_graph();
    let nodes = graph.nodes().as_slice().to_vec();

    let rebuilt =
        SpanAnnotationGraph::with_span_index(nodes.clone(), graph.span_index(), relations(&[1, -1]))
            .unwrap();
    assert_eq!(rebuilt, graph);

    let other = create_argument_graph();
    let other_index = other.span_index().clone();
    assert_eq!(
        SpanAnnotationGraph::with_span_index(nodes, &other_index, relations(&[1, -1])),
        Err(SpanGraphError::SpanIndexMismatch)
    );
}

#[test]
fn test_equality_and_hash_ignore_span_index() {
    let a = create_argument_graph();
    let b = create_argument_graph();
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));

    let (nodes, _) = b.into_parts();
    let rewired = SpanAnnotationGraph::from_registry(
        nodes,
        RelationTable::unrelated(5),
        &GraphConfig::default(),
    )
    .unwrap();
    assert_ne!(a, rewired);
}

#[test]
fn test_interchange_shape_and_round_trip() {
    let graph = create_claim_evidence_graph();
    let json = graph.to_json().unwrap();
    assert_eq!(
        json,
        r#"{"spanAnnotations":[{"textSpan":{"begin":0,"end":5},"label":"claim","attrs":null},{"textSpan":{"begin":6,"end":10},"label":"evidence","attrs":null}],"relations":[1,-1]}"#
    );

    let parsed = SpanAnnotationGraph::<MutableSpanTextLabel>::from_json(&json).unwrap();
    assert_eq!(parsed, graph);
    assert_eq!(parsed.labels_at(&span(6, 10)).unwrap().len(), 1);

    let via_serde: SpanAnnotationGraph<ImmutableSpanTextLabel> = serde_json::from_str(&json).unwrap();
    assert_eq!(via_serde.len(), 2);
}

#[test]
fn test_interchange_rejects_mismatched_lengths() {
    let json = r#"{"spanAnnotations":[
        {"textSpan":{"begin":0,"end":5},"label":"claim","attrs":null},
        {"textSpan":{"begin":6,"end":10},"label":"evidence","attrs":null}],
        "relations":[1]}"#;
    assert_eq!(
        SpanAnnotationGraph::<ImmutableSpanTextLabel>::from_json(json),
        Err(SpanGraphError::RelationTableSizeMismatch {
            nodes: 2,
            relations: 1
        })
    );
    let via_serde: Result<SpanAnnotationGraph<ImmutableSpanTextLabel>, _> =
        serde_json::from_str(json);
    assert!(via_serde.is_err());
}

#[test]
fn test_shared_labels_across_graphs() {
    init_logging();
    let claim = Arc::new(create_test_label(0, 5, "claim").freeze());
    let evidence = Arc::new(create_test_label(6, 10, "evidence").freeze());

    let supported =
        SpanAnnotationGraph::new(vec![claim.clone(), evidence.clone()], relations(&[1, -1]))
            .unwrap();
    let unsupported =
        SpanAnnotationGraph::new(vec![claim.clone(), evidence.clone()], relations(&[-1, -1]))
            .unwrap();

    assert_eq!(supported.relation_target_of(&claim).unwrap(), Some(&evidence));
    assert_eq!(unsupported.relation_target_of(&claim).unwrap(), None);
    assert!(Arc::ptr_eq(supported.get(NodeId::new(0)).unwrap(), &claim));

    let json = supported.to_json().unwrap();
    assert_eq!(
        json,
        SpanAnnotationGraph::new(
            vec![claim.as_ref().clone(), evidence.as_ref().clone()],
            relations(&[1, -1])
        )
        .unwrap()
        .to_json()
        .unwrap()
    );
    let reloaded = SpanAnnotationGraph::<Arc<ImmutableSpanTextLabel>>::from_json(&json).unwrap();
    assert_eq!(reloaded, supported);
    assert_eq!(reloaded.relation_target_of(&claim).unwrap(), Some(&evidence));
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_built_graphs_are_send_and_sync() {
    assert_send_sync::<SpanAnnotationGraph<ImmutableSpanTextLabel>>();
    assert_send_sync::<SpanAnnotationGraph<MutableSpanTextLabel>>();
    assert_send_sync::<SpanAnnotationGraph<Arc<ImmutableSpanTextLabel>>>();
}

#[test]
fn test_concurrent_reads_on_shared_graph() {
    init_logging();
    let graph = create_claim_evidence_graph();
    let claim = create_test_label(0, 5, "claim");
    let evidence = create_test_label(6, 10, "evidence");

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..100 {
                    let labels = graph.labels_at(&span(0, 5)).unwrap();
                    assert_eq!(labels.get("claim"), Some(&&claim));
                    assert_eq!(graph.relation_target_of(&claim).unwrap(), Some(&evidence));
                    assert_eq!(graph.relation_target_of(&evidence).unwrap(), None);
                    assert_eq!(graph.id_of(&evidence), Some(NodeId::new(1)));
                }
            });
        }
    });
}

#[test]
fn test_display_lists_nodes_and_relations() {
    let graph = create_claim_evidence_graph();
    assert_eq!(
        graph.to_string(),
        "SpanAnnotationGraph [nodes=[MutableSpanTextLabel [span=[0, 5), label=claim, attrs=null], \
         MutableSpanTextLabel [span=[6, 10), label=evidence, attrs=null]], relations=[1, -1]]"
    );
}

#[test]
fn test_empty_graph() {
    let graph: SpanAnnotationGraph<ImmutableSpanTextLabel> =
        SpanAnnotationGraph::new(Vec::new(), RelationTable::unrelated(0)).unwrap();
    assert!(graph.is_empty());
    assert_eq!(graph.to_json().unwrap(), r#"{"spanAnnotations":[],"relations":[]}"#);
    assert!(graph.labels_at(&span(0, 0)).is_err());
    assert_eq!(graph.find_cycle(), None);
}
