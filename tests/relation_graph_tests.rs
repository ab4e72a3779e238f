//! Relation graph behavior against a real database file.
//!
//! The pure traversal algorithms have unit tests next to their code; these
//! tests exercise them over edges stored through the repository layer,
//! including per-user isolation and cascade behavior.
//!
//! Run with: `cargo test --test relation_graph_tests`

use tempfile::TempDir;

use lucid_journal::db::Database;
use lucid_journal::graph::{self, Direction};
use lucid_journal::models::{EntryType, RelationType};
use lucid_journal::repo::entries::{self, NewEntry};
use lucid_journal::repo::{relations, users};

struct Fixture {
    db: Database,
    _dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let db = Database::open(dir.path().join("graph.db")).expect("open database");
        Self { db, _dir: dir }
    }

    fn user(&self, name: &str) -> i64 {
        let conn = self.db.conn();
        users::create(&conn, name, &format!("{name}@example.com"), "hash")
            .unwrap()
            .id
    }

    fn entry(&self, user_id: i64, content: &str) -> i64 {
        let conn = self.db.conn();
        entries::create(
            &conn,
            user_id,
            &NewEntry {
                entry_type: EntryType::Thought,
                title: None,
                content: content.to_string(),
                body_state_id: None,
                circumstance_id: None,
                deadline: None,
            },
        )
        .unwrap()
        .id
    }

    fn relate(&self, user_id: i64, from: i64, to: i64) -> i64 {
        let conn = self.db.conn();
        relations::create(&conn, user_id, from, to, RelationType::LedTo, None)
            .unwrap()
            .id
    }
}

#[test]
fn test_edges_are_isolated_per_user() {
    let f = Fixture::new();
    let alice = f.user("alice");
    let bob = f.user("bob");

    let a1 = f.entry(alice, "a1");
    let a2 = f.entry(alice, "a2");
    let b1 = f.entry(bob, "b1");
    let b2 = f.entry(bob, "b2");
    f.relate(alice, a1, a2);
    f.relate(bob, b1, b2);

    let conn = f.db.conn();
    let alice_edges = relations::edges_for_user(&conn, alice).unwrap();
    assert_eq!(alice_edges.len(), 1);
    assert_eq!(alice_edges[0].from, a1);

    // Bob's walk never reaches Alice's entries
    let bob_edges = relations::edges_for_user(&conn, bob).unwrap();
    let chain = graph::walk_chain(&bob_edges, b1, 10, Direction::Both);
    assert!(chain.nodes.iter().all(|n| n.entry_id == b1 || n.entry_id == b2));
}

#[test]
fn test_cycle_detection_over_stored_edges() {
    let f = Fixture::new();
    let user = f.user("alice");
    let a = f.entry(user, "a");
    let b = f.entry(user, "b");
    let c = f.entry(user, "c");
    f.relate(user, a, b);
    f.relate(user, b, c);

    let conn = f.db.conn();
    let edges = relations::edges_for_user(&conn, user).unwrap();

    assert!(graph::would_create_cycle(&edges, c, a));
    assert!(graph::would_create_cycle(&edges, b, a));
    assert!(!graph::would_create_cycle(&edges, a, c));

    drop(conn);

    // The cyclic edge can still be stored; the walk still terminates
    f.relate(user, c, a);
    let conn = f.db.conn();
    let edges = relations::edges_for_user(&conn, user).unwrap();
    let chain = graph::walk_chain(&edges, a, 100, Direction::Forward);
    assert_eq!(chain.entry_count, 3);
}

#[test]
fn test_chain_depth_annotations() {
    let f = Fixture::new();
    let user = f.user("alice");
    let ids: Vec<i64> = (0..5).map(|i| f.entry(user, &format!("e{i}"))).collect();
    for pair in ids.windows(2) {
        f.relate(user, pair[0], pair[1]);
    }

    let conn = f.db.conn();
    let edges = relations::edges_for_user(&conn, user).unwrap();

    let chain = graph::walk_chain(&edges, ids[0], 3, Direction::Forward);
    assert_eq!(chain.entry_count, 4);
    assert_eq!(chain.total_depth, 3);
    for (i, node) in chain.nodes.iter().enumerate() {
        assert_eq!(node.entry_id, ids[i]);
        assert_eq!(node.depth, i);
    }

    // Backward walk from the tail covers the same path
    let chain = graph::walk_chain(&edges, ids[4], 10, Direction::Backward);
    assert_eq!(chain.entry_count, 5);
    assert_eq!(chain.total_depth, 4);
}

#[test]
fn test_degree_ranking_over_stored_edges() {
    let f = Fixture::new();
    let user = f.user("alice");
    let hub = f.entry(user, "hub");
    let spokes: Vec<i64> = (0..4).map(|i| f.entry(user, &format!("s{i}"))).collect();
    for &spoke in &spokes {
        f.relate(user, hub, spoke);
    }
    f.relate(user, spokes[0], spokes[1]);

    let conn = f.db.conn();
    let edges = relations::edges_for_user(&conn, user).unwrap();
    let ranked = graph::rank_by_degree(&edges, 3);

    assert_eq!(ranked[0], (hub, 4));
    assert_eq!(ranked.len(), 3);
    assert_eq!(ranked[1].1, 2); // the two linked spokes tie at degree 2
    assert_eq!(ranked[2].1, 2);
}

#[test]
fn test_entry_deletion_cascades_into_the_graph() {
    let f = Fixture::new();
    let user = f.user("alice");
    let a = f.entry(user, "a");
    let b = f.entry(user, "b");
    let c = f.entry(user, "c");
    f.relate(user, a, b);
    f.relate(user, b, c);

    {
        let conn = f.db.conn();
        entries::delete(&conn, user, b).unwrap();
    }

    let conn = f.db.conn();
    let edges = relations::edges_for_user(&conn, user).unwrap();
    assert!(edges.is_empty());

    let chain = graph::walk_chain(&edges, a, 10, Direction::Both);
    assert_eq!(chain.entry_count, 1);
}
