//! Registering types and writing them as compounds.
//!
//! Run with: cargo run --example custom_types

use fron::{parse, register, stringify, Encoded, Error as FronError, TypeOptions, Value};
use serde::{Deserialize, Serialize};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Money {
    cents: i64,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Structural encoding through serde
    register(TypeOptions::<Money>::new())?;

    // A compact positional body
    register(
        TypeOptions::<Point>::new()
            .name("Pt")
            .encode(|p| Ok(Encoded::Body(fron::fron!([(p.x), (p.y)]))))
            .decode(|body| {
                let x = body.index(0).and_then(|v| v.as_i64());
                let y = body.index(1).and_then(|v| v.as_i64());
                match (x, y) {
                    (Some(x), Some(y)) => Ok(Point {
                        x: i32::try_from(x).map_err(FronError::custom)?,
                        y: i32::try_from(y).map_err(FronError::custom)?,
                    }),
                    _ => Err(FronError::custom("expected [x, y]")),
                }
            }),
    )?;

    let doc = Value::array(vec![
        Value::custom(Money { cents: 1999 }),
        Value::custom(Point { x: 3, y: -4 }),
        Value::record("Unregistered", Value::from("kept as is")),
    ]);

    let text = stringify(&doc, false)?;
    println!("FRON output:\n{}\n", text);

    let back = parse(&text)?;
    let point = back.index(1).ok_or("missing point")?;
    let compound = point.as_compound().ok_or("not a compound")?.borrow();
    assert_eq!(compound.downcast_ref::<Point>(), Some(&Point { x: 3, y: -4 }));
    println!("✓ Registered types decoded into Rust values");

    Ok(())
}
