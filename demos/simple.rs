//! Basic FRON serialization and deserialization.
//!
//! Run with: cargo run --example simple

use fron::{from_str, parse, stringify, to_string};
use serde::{Deserialize, Serialize};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct User {
    id: u32,
    name: String,
    email: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let users = vec![
        User {
            id: 42,
            name: "Alice Johnson".to_string(),
            email: "alice@example.com".to_string(),
        },
        User {
            id: 43,
            name: "Bob Smith".to_string(),
            email: "bob@example.com".to_string(),
        },
    ];

    // Serialize to FRON
    let text = to_string(&users)?;
    println!("FRON output:\n{}\n", text);

    // Deserialize back to struct
    let users_back: Vec<User> = from_str(&text)?;
    assert_eq!(users, users_back);
    println!("✓ Round-trip successful");

    // Literals JSON cannot express
    let value = parse("{big: 123456789012345678901234567890n, nan: NaN, re: /^a+$/i}")?;
    println!("\nTyped literals:\n{}", stringify(&value, true)?);

    Ok(())
}
