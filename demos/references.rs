//! Shared and circular data.
//!
//! Run with: cargo run --example references

use fron::{fron, parse, stringify};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let alice = fron!({ "name": "Alice" });
    let bob = fron!({ "name": "Bob" });
    alice.insert("friend", bob.clone())?;
    bob.insert("friend", alice.clone())?;

    let team = fron!({ "lead": (alice.clone()), "members": [(alice), (bob)] });
    team.insert("team", team.clone())?;

    let text = stringify(&team, true)?;
    println!("FRON output:\n{}\n", text);

    let back = parse(&text)?;
    let lead = back.get("lead").ok_or("missing lead")?;
    let first = back
        .get("members")
        .and_then(|members| members.index(0))
        .ok_or("missing member")?;
    assert!(lead.ptr_eq(&first));

    let friend_of_friend = lead
        .get("friend")
        .and_then(|friend| friend.get("friend"))
        .ok_or("missing friend")?;
    assert!(friend_of_friend.ptr_eq(&lead));
    println!("✓ Shared nodes and cycles rebuilt with the same shape");

    Ok(())
}
