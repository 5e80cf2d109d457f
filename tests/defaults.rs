//! Default-binder coverage: scalar, nested, character, time and address
//! defaults, fill precedence and idempotence.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use leafbind::{Bind, ComposedBinder, DefaultBinder, LeafError, Schema, TargetKind, compose_binders};
use rstest::rstest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct Limits {
    workers: u16,
    burst: i32,
    ratio: f64,
}

fn limits_schema() -> Arc<Schema> {
    Schema::builder()
        .leaf_default("workers", TargetKind::U16, "27")
        .leaf_default("burst", TargetKind::I32, "-27")
        .leaf_default("ratio", TargetKind::F64, "27.1")
        .build()
}

#[rstest]
fn scalar_defaults_fill_a_fresh_struct() -> Result<()> {
    let mut limits = Limits::default();
    DefaultBinder::builder(limits_schema())
        .build()
        .apply(&mut limits)?;

    assert_eq!(limits.workers, 27);
    assert_eq!(limits.burst, -27);
    assert!((limits.ratio - 27.1).abs() < 1e-9);
    Ok(())
}

#[rstest]
fn populated_fields_keep_their_values() -> Result<()> {
    let mut limits = Limits {
        workers: 5,
        burst: 0,
        ratio: 0.0,
    };
    let binder = DefaultBinder::builder(limits_schema()).build();
    binder.apply(&mut limits)?;

    assert_eq!(limits.workers, 5, "bound value must not be overridden");
    assert_eq!(limits.burst, -27);

    // Re-application is a no-op.
    let before = Limits {
        workers: limits.workers,
        burst: limits.burst,
        ratio: limits.ratio,
    };
    binder.apply(&mut limits)?;
    assert_eq!(limits, before);
    Ok(())
}

#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
struct User {
    name: String,
    age: u8,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct House {
    address: String,
    owner: User,
    tenant: User,
}

#[rstest]
fn nested_siblings_receive_identical_defaults() -> Result<()> {
    let user = Schema::builder()
        .leaf_default("name", TargetKind::Text, "anon")
        .leaf_default("age", TargetKind::U8, "30")
        .build();
    let house = Schema::builder()
        .leaf("address", TargetKind::Text)
        .nested("owner", user.clone())
        .nested("tenant", user)
        .build();

    let mut dest = House::default();
    DefaultBinder::builder(house).build().apply(&mut dest)?;

    let expected = User {
        name: "anon".to_owned(),
        age: 30,
    };
    assert_eq!(dest.owner, expected);
    assert_eq!(dest.tenant, expected);
    assert_eq!(dest.address, "", "field without a default stays at zero");
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
struct Glyphs {
    sep: u8,
    point: char,
}

#[rstest]
fn character_literals_fill_byte_and_code_point_fields() -> Result<()> {
    let schema = Schema::builder()
        .leaf_default("sep", TargetKind::U8, "a")
        .leaf_default("point", TargetKind::Char, "好")
        .build();

    let mut glyphs = Glyphs {
        sep: 0,
        point: '\0',
    };
    DefaultBinder::builder(schema).build().apply(&mut glyphs)?;

    assert_eq!(glyphs.sep, 97);
    assert_eq!(glyphs.point, '好');
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
struct Net {
    deadline: Option<DateTime<Utc>>,
    every: Duration,
    host: Option<IpAddr>,
}

#[rstest]
fn time_duration_and_address_defaults_decode() -> Result<()> {
    let schema = Schema::builder()
        .leaf_default("deadline", TargetKind::Timestamp, "2006-01-02T15:04:05Z")
        .leaf_default("every", TargetKind::Duration, "1h")
        .leaf_default("host", TargetKind::Ip, "1.1.1.1")
        .build();

    let mut net = Net {
        deadline: None,
        every: Duration::ZERO,
        host: None,
    };
    DefaultBinder::builder(schema).build().apply(&mut net)?;

    assert_eq!(
        net.deadline,
        Some(Utc.with_ymd_and_hms(2006, 1, 2, 15, 4, 5).unwrap())
    );
    assert_eq!(net.every, Duration::from_secs(3600));
    assert_eq!(net.host, Some("1.1.1.1".parse()?));
    Ok(())
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Retrying {
    retries: u32,
    backoff: u32,
}

#[rstest]
fn explicit_registration_wins_over_flattened_schema() -> Result<()> {
    let embedded = Schema::builder()
        .leaf_default("retries", TargetKind::U32, "3")
        .leaf_default("backoff", TargetKind::U32, "250")
        .build();
    let schema = Schema::builder()
        .flatten(embedded)
        .leaf_default("retries", TargetKind::U32, "9")
        .build();

    let mut dest = Retrying::default();
    DefaultBinder::builder(schema).build().apply(&mut dest)?;

    assert_eq!(dest.retries, 9);
    assert_eq!(dest.backoff, 250);
    Ok(())
}

#[rstest]
fn unparseable_literal_names_the_field() {
    let schema = Schema::builder()
        .leaf_default("workers", TargetKind::U16, "many")
        .build();
    let mut limits = Limits::default();
    let err = DefaultBinder::builder(schema)
        .build()
        .apply(&mut limits)
        .unwrap_err();

    match err {
        LeafError::Default { field, source } => {
            assert_eq!(field, "workers");
            assert_eq!(source.value(), "many");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn composed_binders_run_in_order() -> Result<()> {
    let binder: ComposedBinder<Limits> = compose_binders(vec![
        Box::new(DefaultBinder::builder(limits_schema()).build()),
    ]);
    assert_eq!(binder.name(), "compose_default");

    let mut limits = Limits::default();
    binder.bind(&mut limits)?;
    assert_eq!(limits.workers, 27);
    Ok(())
}

#[rstest]
#[should_panic(expected = "at least one binder is required")]
fn composing_zero_binders_is_a_programmer_error() {
    let _ = compose_binders::<Limits>(Vec::new());
}

#[rstest]
fn list_defaults_split_and_coerce() -> Result<()> {
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Fanout {
        ports: Vec<u16>,
        tags: Vec<String>,
    }

    let schema = Schema::builder()
        .leaf_default(
            "ports",
            TargetKind::List(Box::new(TargetKind::U16)),
            "80,443,8080",
        )
        .leaf_default(
            "tags",
            TargetKind::List(Box::new(TargetKind::Text)),
            "alpha,beta",
        )
        .build();

    let mut fanout = Fanout::default();
    DefaultBinder::builder(schema).build().apply(&mut fanout)?;

    assert_eq!(fanout.ports, vec![80, 443, 8080]);
    assert_eq!(fanout.tags, vec!["alpha".to_owned(), "beta".to_owned()]);
    Ok(())
}
