//! End-to-end pipelines: keystream stages, fan-out, ownership and teardown

mod common;

use cipherpipe::config::KeystreamSettings;
use cipherpipe::{
    Arc4, BufferSink, Chain, CipherPipeError, ErrorKind, FilterGraph, Fork, KeystreamFilter,
    Passthrough, StreamCipher, TopologyError,
};

fn arc4_stage(key: &[u8]) -> KeystreamFilter {
    KeystreamFilter::arc4(key, &KeystreamSettings::default()).unwrap()
}

fn run(graph: &mut FilterGraph, root: cipherpipe::NodeId, parts: &[&[u8]]) {
    graph.start_message(root).unwrap();
    for part in parts {
        graph.write(root, part).unwrap();
    }
    graph.end_message(root).unwrap();
}

#[test]
fn test_encrypt_then_decrypt_round_trip() {
    common::init_tracing();
    let mut graph = FilterGraph::new();
    let encrypt = graph.add(arc4_stage(b"Secret"));
    let decrypt = graph.add(arc4_stage(b"Secret"));
    let sink = graph.add(BufferSink::new());
    graph.builder().attach(encrypt, decrypt).unwrap();
    graph.builder().attach(encrypt, sink).unwrap();
    assert_eq!(graph.downstream(decrypt).unwrap(), vec![sink]);

    run(&mut graph, encrypt, &[b"Attack ", b"at", b" dawn"]);
    assert_eq!(graph.take_output(sink).unwrap(), b"Attack at dawn");
}

#[test]
fn test_fork_broadcasts_ciphertext() {
    let mut graph = FilterGraph::new();
    let encrypt = graph.add(arc4_stage(b"Wiki"));
    let fork = graph.add_fanout(Fork::new());
    let decrypt = graph.add(arc4_stage(b"Wiki"));
    let plain_sink = graph.add(BufferSink::new());
    let cipher_sink = graph.add(BufferSink::new());

    graph.builder().attach(encrypt, fork).unwrap();
    graph
        .fanout(fork)
        .unwrap()
        .set_downstream(&[decrypt, cipher_sink])
        .unwrap();
    graph.builder().attach(decrypt, plain_sink).unwrap();

    run(&mut graph, encrypt, &[b"ped", b"ia"]);
    assert_eq!(graph.output(plain_sink).unwrap(), b"pedia");
    assert_eq!(
        graph.output(cipher_sink).unwrap(),
        common::unhex("1021bf0420").as_slice()
    );
}

#[test]
fn test_routing_fork_follows_active_port() {
    let mut graph = FilterGraph::new();
    let fork = graph.add_fanout(Fork::routing());
    let left = graph.add(BufferSink::new());
    let right = graph.add(BufferSink::new());
    graph.fanout(fork).unwrap().set_downstream(&[left, right]).unwrap();
    assert_eq!(graph.builder().total_ports(fork).unwrap(), 2);

    graph.fanout(fork).unwrap().set_port(1).unwrap();
    run(&mut graph, fork, &[b"to the right"]);
    graph.fanout(fork).unwrap().set_port(0).unwrap();
    assert_eq!(graph.builder().next(fork).unwrap(), Some(left));
    run(&mut graph, fork, &[b"to the left"]);

    assert_eq!(graph.output(left).unwrap(), b"to the left");
    assert_eq!(graph.output(right).unwrap(), b"to the right");
    assert!(matches!(
        graph.fanout(fork).unwrap().set_port(2).unwrap_err(),
        CipherPipeError::Topology(TopologyError::PortOutOfRange { port: 2, total: 2, .. })
    ));
}

#[test]
fn test_attach_below_sink_changes_nothing() {
    let mut graph = FilterGraph::new();
    let head = graph.add(Passthrough::new());
    let sink = graph.add(BufferSink::new());
    let extra = graph.add(Passthrough::new());
    graph.builder().attach(head, sink).unwrap();

    // Walking from `head` ends at the sink, which refuses children.
    let err = graph.builder().attach(head, extra).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Topology);
    assert_eq!(graph.downstream(head).unwrap(), vec![sink]);
    assert!(graph.downstream(sink).unwrap().is_empty());
    assert!(!graph.is_claimed(extra).unwrap());
    assert!(!graph.is_attachable(sink).unwrap());
}

#[test]
fn test_chain_stage_encrypts_and_tears_down() {
    let mut graph = FilterGraph::new();
    let encrypt = graph.add(arc4_stage(b"Key"));
    let relay = graph.add(Passthrough::new());
    let sink = graph.add(BufferSink::new());
    let chain = Chain::build(&mut graph, &[encrypt, relay, sink]).unwrap();
    assert_eq!(graph.name(chain).unwrap(), "Chain");

    run(&mut graph, chain, &[b"Plain", b"text"]);
    assert_eq!(
        graph.take_output(sink).unwrap(),
        common::unhex("bbf316e8d940af0ad3")
    );

    assert_eq!(graph.destroy(chain).unwrap(), 4);
    assert!(graph.is_empty());
    assert!(matches!(
        graph.write(sink, b"gone").unwrap_err(),
        CipherPipeError::Topology(TopologyError::UnknownNode { .. })
    ));
}

#[test]
fn test_borrowed_children_outlive_their_parent() {
    let mut graph = FilterGraph::new();
    let root = graph.add(Passthrough::new());
    let shared = graph.add(Passthrough::new());
    graph.builder().set_downstream(root, &[shared]).unwrap();
    assert_eq!(graph.builder().owned_count(root).unwrap(), 0);

    assert_eq!(graph.destroy(root).unwrap(), 1);
    assert!(!graph.is_claimed(shared).unwrap());

    let new_root = graph.add(Passthrough::new());
    graph.builder().attach(new_root, shared).unwrap();
    run(&mut graph, new_root, &[b"reused"]);
    assert_eq!(graph.output(shared).unwrap(), b"reused");
}

#[test]
fn test_node_cannot_join_two_pipelines() {
    let mut graph = FilterGraph::new();
    let first = graph.add(Passthrough::new());
    let second = graph.add(Passthrough::new());
    let node = graph.add(BufferSink::new());
    graph.builder().attach(first, node).unwrap();

    assert!(graph.builder().attach(second, node).is_err());
    assert!(graph.builder().set_downstream(second, &[node]).is_err());
    assert!(Chain::build(&mut graph, &[node]).is_err());
    assert_eq!(graph.downstream(first).unwrap(), vec![node]);
    assert!(graph.downstream(second).unwrap().is_empty());

    let mut other = FilterGraph::new();
    let outsider = other.add(Passthrough::new());
    assert!(matches!(
        graph.builder().attach(outsider, node).unwrap_err(),
        CipherPipeError::Topology(TopologyError::ForeignNode { .. })
    ));
}

#[test]
fn test_cleared_engine_inside_pipeline() {
    let mut engine = Arc4::new(b"Key").unwrap();
    engine.clear();
    let mut graph = FilterGraph::new();
    let stage = graph.add(KeystreamFilter::new(engine));
    let sink = graph.add(BufferSink::new());
    graph.builder().attach(stage, sink).unwrap();

    graph.start_message(stage).unwrap();
    let err = graph.write(stage, b"data").unwrap_err();
    assert!(matches!(err, CipherPipeError::EngineCleared { .. }));
    graph.end_message(stage).unwrap();
    assert!(graph.output(sink).unwrap().is_empty());
}

#[test]
fn test_refused_write_keeps_keystream_position() {
    let mut graph = FilterGraph::new();
    let stage = graph.add(arc4_stage(b"Key"));
    let relay = graph.add(Passthrough::new());
    graph.builder().attach(stage, relay).unwrap();

    assert!(matches!(
        graph.write(stage, b"Plain").unwrap_err(),
        CipherPipeError::MessageNotStarted { .. }
    ));
    assert!(graph.end_message(relay).is_err());

    run(&mut graph, stage, &[b"Plain", b"text"]);
    assert_eq!(
        graph.take_output(relay).unwrap(),
        common::unhex("bbf316e8d940af0ad3")
    );
}
