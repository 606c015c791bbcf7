//! Integration tests for the `#[derive(Bind)]` macro.

use palimpsest::{Bind, CoerceError};

#[derive(Bind, Default, Debug, PartialEq)]
struct Server {
    listen: String,
    port: u16,
    verbose: bool,
    #[bind(rename = "DB")]
    database: Option<Database>,
    #[bind(skip)]
    generation: u64,
}

#[derive(Bind, Default, Debug, PartialEq)]
struct Database {
    host: String,
    pool_size: u32,
}

#[test]
fn binds_flat_field_by_uppercased_name() {
    let mut server = Server::default();
    assert_eq!(server.bind_text("LISTEN", '_', ":8080"), Ok(true));
    assert_eq!(server.listen, ":8080");
}

#[test]
fn binds_numeric_and_bool_leaves() {
    let mut server = Server::default();
    assert_eq!(server.bind_text("PORT", '_', "8443"), Ok(true));
    assert_eq!(server.bind_text("VERBOSE", '_', "true"), Ok(true));
    assert_eq!(server.port, 8443);
    assert!(server.verbose);
}

#[test]
fn rename_replaces_default_source_key() {
    let mut server = Server::default();
    assert_eq!(server.bind_text("DB_HOST", '_', "db.internal"), Ok(true));
    assert_eq!(server.database.as_ref().unwrap().host, "db.internal");

    // The field name itself no longer matches.
    assert_eq!(server.bind_text("DATABASE_HOST", '_', "x"), Ok(false));
}

#[test]
fn multi_segment_key_reaches_nested_leaf() {
    let mut server = Server::default();
    assert_eq!(server.bind_text("DB_POOL_SIZE", '_', "32"), Ok(true));
    assert_eq!(server.database.unwrap().pool_size, 32);
}

#[test]
fn skipped_field_is_invisible() {
    let mut server = Server::default();
    assert_eq!(server.bind_text("GENERATION", '_', "7"), Ok(false));
    assert_eq!(server.generation, 0);
}

#[test]
fn unmatched_key_is_not_an_error() {
    let mut server = Server::default();
    assert_eq!(server.bind_text("NO_SUCH_FIELD", '_', "x"), Ok(false));
    assert_eq!(server, Server::default());
}

#[test]
fn optional_subtree_stays_unallocated_on_miss() {
    let mut server = Server::default();
    assert_eq!(server.bind_text("DB_FLAVOR", '_', "mysql"), Ok(false));
    assert_eq!(server.database, None);
}

#[test]
fn optional_subtree_keeps_allocation_on_coerce_failure() {
    let mut server = Server::default();
    let err = server.bind_text("DB_POOL_SIZE", '_', "lots").unwrap_err();
    assert!(matches!(err, CoerceError::Int(_)));
    // The key resolved to a real leaf, so the subtree was materialized.
    assert_eq!(server.database, Some(Database::default()));
}

#[test]
fn empty_key_on_struct_is_unsupported() {
    let mut server = Server::default();
    let err = server.bind_text("", '_', "x").unwrap_err();
    assert!(matches!(err, CoerceError::Unsupported(_)));
}

#[test]
fn coerce_error_carries_leaf_message() {
    let mut server = Server::default();
    let err = server.bind_text("PORT", '_', "99999999").unwrap_err();
    assert!(err.to_string().starts_with("invalid integer"));
}

// HOST and HOSTNAME are fine as siblings: HOSTNAME is not HOST followed by
// a separator, so neither can consume the other's keys.
#[derive(Bind, Default, Debug, PartialEq)]
struct SimilarKeys {
    host: String,
    hostname: String,
}

#[test]
fn plain_prefix_siblings_do_not_collide() {
    let mut target = SimilarKeys::default();
    assert_eq!(target.bind_text("HOST", '_', "a"), Ok(true));
    assert_eq!(target.bind_text("HOSTNAME", '_', "b"), Ok(true));
    assert_eq!(target.host, "a");
    assert_eq!(target.hostname, "b");
}

#[derive(Bind, Default, Debug, PartialEq)]
struct Outer {
    inner: Box<Leaf>,
}

#[derive(Bind, Default, Debug, PartialEq)]
struct Leaf {
    value: i64,
}

#[test]
fn boxed_field_delegates() {
    let mut outer = Outer::default();
    assert_eq!(outer.bind_text("INNER_VALUE", '_', "-5"), Ok(true));
    assert_eq!(outer.inner.value, -5);
}

mod custom_leaves {
    use super::*;
    use std::net::SocketAddr;

    #[derive(Debug, Default, PartialEq)]
    struct Endpoint(Option<SocketAddr>);

    impl std::str::FromStr for Endpoint {
        type Err = std::net::AddrParseError;
        fn from_str(s: &str) -> Result<Self, Self::Err> {
            s.parse().map(|a| Endpoint(Some(a)))
        }
    }

    palimpsest::bind_via_from_str!(Endpoint);

    #[derive(Bind, Default, Debug, PartialEq)]
    struct Gateway {
        upstream: Endpoint,
    }

    #[test]
    fn from_str_leaf_participates_in_derive() {
        let mut gateway = Gateway::default();
        assert_eq!(gateway.bind_text("UPSTREAM", '_', "127.0.0.1:9000"), Ok(true));
        assert_eq!(
            gateway.upstream,
            Endpoint(Some("127.0.0.1:9000".parse().unwrap()))
        );
    }

    #[test]
    fn from_str_error_passes_through_verbatim() {
        let mut gateway = Gateway::default();
        let err = gateway.bind_text("UPSTREAM", '_', "nope").unwrap_err();
        let expected = "nope".parse::<SocketAddr>().unwrap_err().to_string();
        assert_eq!(err, CoerceError::Custom(expected));
    }
}
