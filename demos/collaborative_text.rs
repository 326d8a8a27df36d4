//! Collaborative Text Editing Example
//!
//! Two replicas edit the same document concurrently, exchange the
//! operations their edits produced, and converge on the same text
//! without any coordination.
//!
//! Run with: cargo run --example collaborative_text

use mdcs_lseq::Lseq;

fn main() {
    println!("=== Collaborative Text Editing Example ===\n");

    // Two independent replicas: unique site ids, same jitter bound
    let mut alice = Lseq::new(1, 10);
    let mut bob = Lseq::new(2, 10);

    // Alice writes a greeting and keeps the ops for broadcast
    println!("Alice types \"hello\"...");
    let mut alice_ops = Vec::new();
    for (i, ch) in "hello".chars().enumerate() {
        alice_ops.push(alice.insert(i, ch).expect("local insert"));
    }
    println!("  Alice's view: {:?}", alice.render());

    // Bob, still unsynced, types his own text at position 0
    println!("\nBob types \"world\" concurrently...");
    let mut bob_ops = Vec::new();
    for (i, ch) in "world".chars().enumerate() {
        bob_ops.push(bob.insert(i, ch).expect("local insert"));
    }
    println!("  Bob's view:   {:?}", bob.render());

    // The transport delivers each side's ops to the other
    println!("\nExchanging operations...");
    for op in &bob_ops {
        alice.apply(op).expect("remote apply");
    }
    for op in &alice_ops {
        bob.apply(op).expect("remote apply");
    }

    println!("  Alice's view: {:?}", alice.render());
    println!("  Bob's view:   {:?}", bob.render());
    assert_eq!(alice.render(), bob.render());

    // Alice deletes the first word; the removal replicates too
    println!("\nAlice deletes the first five characters...");
    let mut removals = Vec::new();
    for _ in 0..5 {
        removals.push(alice.remove(0).expect("local remove"));
    }
    for op in &removals {
        bob.apply(op).expect("remote apply");
    }

    println!("  Alice's view: {:?}", alice.render());
    println!("  Bob's view:   {:?}", bob.render());
    assert_eq!(alice.render(), bob.render());

    println!("\nAllocation tree on Alice's replica:");
    print!("{}", alice.dump_tree());

    println!("\n✓ Both replicas converged");
}
