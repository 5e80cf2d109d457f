//! Loader precedence: registered defaults, in-struct values, environment
//! variables, then the dotenv file, decoded in one pass.

use std::sync::Arc;

use leafbind::{ConfigLoader, LeafError, Schema, TargetKind};
use serde::{Deserialize, Serialize};
use serial_test::serial;

#[derive(Debug, Default, Serialize, Deserialize)]
struct Outer {
    g: Inner,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Inner {
    h: u32,
}

fn outer_schema() -> Arc<Schema> {
    let inner = Schema::builder()
        .leaf_default("h", TargetKind::U32, "1")
        .build();
    Schema::builder().nested("g", inner).build()
}

fn jailed(err: LeafError) -> figment::Error {
    figment::Error::from(err.to_string())
}

#[test]
#[serial]
fn registered_defaults_apply_when_nothing_else_is_set() {
    figment::Jail::expect_with(|_jail| {
        let loader = ConfigLoader::builder()
            .env_prefix("LEAFTEST_")
            .schema(outer_schema())
            .build();
        let mut outer = Outer::default();
        loader.load(&mut outer).map_err(jailed)?;
        assert_eq!(outer.g.h, 1);
        Ok(())
    });
}

#[test]
#[serial]
fn environment_variables_override_defaults() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("LEAFTEST_G_H", "7");
        let loader = ConfigLoader::builder()
            .env_prefix("LEAFTEST_")
            .schema(outer_schema())
            .build();
        let mut outer = Outer::default();
        loader.load(&mut outer).map_err(jailed)?;
        assert_eq!(outer.g.h, 7);
        Ok(())
    });
}

#[test]
#[serial]
fn the_dotenv_file_overrides_the_environment() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("LEAFTEST_G_H", "7");
        jail.create_file(".env", "LEAFTEST_G_H=9\n")?;
        let loader = ConfigLoader::builder()
            .env_prefix("LEAFTEST_")
            .schema(outer_schema())
            .build();
        let mut outer = Outer::default();
        loader.load(&mut outer).map_err(jailed)?;
        assert_eq!(outer.g.h, 9);
        Ok(())
    });
}

#[test]
#[serial]
fn in_struct_values_beat_defaults_but_not_the_environment() {
    figment::Jail::expect_with(|jail| {
        let loader = ConfigLoader::builder()
            .env_prefix("LEAFTEST_")
            .schema(outer_schema())
            .build();

        // A pre-populated field survives the defaults layer...
        let mut outer = Outer {
            g: Inner { h: 4 },
        };
        loader.load(&mut outer).map_err(jailed)?;
        assert_eq!(outer.g.h, 4);

        // ...but loses to an environment variable.
        jail.set_env("LEAFTEST_G_H", "7");
        loader.load(&mut outer).map_err(jailed)?;
        assert_eq!(outer.g.h, 7);
        Ok(())
    });
}

#[test]
#[serial]
fn variables_outside_the_prefix_are_ignored() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("OTHERAPP_G_H", "99");
        let loader = ConfigLoader::builder()
            .env_prefix("LEAFTEST_")
            .schema(outer_schema())
            .build();
        let mut outer = Outer::default();
        loader.load(&mut outer).map_err(jailed)?;
        assert_eq!(outer.g.h, 1, "prefix mismatch must leave the default");
        Ok(())
    });
}

#[test]
#[serial]
fn a_missing_dotenv_file_is_not_an_error() {
    figment::Jail::expect_with(|_jail| {
        let loader = ConfigLoader::builder()
            .env_prefix("LEAFTEST_")
            .dotenv_file("does-not-exist.env")
            .schema(outer_schema())
            .build();
        let mut outer = Outer::default();
        loader.load(&mut outer).map_err(jailed)?;
        assert_eq!(outer.g.h, 1);
        Ok(())
    });
}

#[test]
#[serial]
fn a_custom_split_pattern_nests_keys() {
    figment::Jail::expect_with(|jail| {
        jail.set_env("LEAFTEST_G__H", "5");
        let loader = ConfigLoader::builder()
            .env_prefix("LEAFTEST_")
            .env_split("__")
            .schema(outer_schema())
            .build();
        let mut outer = Outer::default();
        loader.load(&mut outer).map_err(jailed)?;
        assert_eq!(outer.g.h, 5);
        Ok(())
    });
}

#[test]
#[serial]
fn comma_separated_variables_decode_as_lists() {
    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Fanout {
        hosts: Vec<String>,
    }

    figment::Jail::expect_with(|jail| {
        jail.set_env("LEAFTEST_HOSTS", "a.example,b.example");
        let loader = ConfigLoader::builder().env_prefix("LEAFTEST_").build();
        let mut fanout = Fanout::default();
        loader.load(&mut fanout).map_err(jailed)?;
        assert_eq!(fanout.hosts, vec!["a.example", "b.example"]);
        Ok(())
    });
}

#[test]
fn a_non_map_destination_is_rejected() {
    let loader = ConfigLoader::builder().build();
    let mut dest = vec![1_u32];
    let err = loader.load(&mut dest).unwrap_err();
    assert!(matches!(
        err,
        LeafError::InvalidDestination { found: "an array" }
    ));
}
