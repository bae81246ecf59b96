//! End-to-end assembly over an in-memory catalog.
//!
//! The fixture mirrors a slice of a channel/product schema: tables whose
//! primary keys are sequence-backed surrogates, label/name unique indexes,
//! and a membership table whose only unique index is made of foreign keys.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;

use schemaprobe::{CatalogError, CatalogProvider, CatalogResult, SchemaAssembler, Table};

#[derive(Default, Clone)]
struct FixtureTable {
    columns: Vec<String>,
    primary_key: Vec<String>,
    sequence: Option<String>,
    unique_indexes: Vec<(String, Vec<String>)>,
    foreign_keys: Vec<(String, String, Vec<(String, String)>)>,
}

#[derive(Default)]
struct FixtureCatalog {
    order: Vec<String>,
    tables: HashMap<String, FixtureTable>,
    fail_on: Option<String>,
}

impl FixtureCatalog {
    fn add(&mut self, name: &str, table: FixtureTable) {
        self.order.push(name.to_string());
        self.tables.insert(name.to_string(), table);
    }

    fn get(&self, table: &str) -> CatalogResult<&FixtureTable> {
        if self.fail_on.as_deref() == Some(table) {
            return Err(CatalogError::Provider(format!(
                "fixture failure for {table}"
            )));
        }
        self.tables
            .get(table)
            .ok_or_else(|| CatalogError::Provider(format!("unknown table {table}")))
    }
}

#[async_trait]
impl CatalogProvider for FixtureCatalog {
    async fn target_tables(&self) -> CatalogResult<Vec<String>> {
        Ok(self.order.clone())
    }

    async fn columns(&self, table: &str) -> CatalogResult<Vec<String>> {
        Ok(self.get(table)?.columns.clone())
    }

    async fn primary_key_columns(&self, table: &str) -> CatalogResult<BTreeSet<String>> {
        Ok(self.get(table)?.primary_key.iter().cloned().collect())
    }

    async fn primary_key_sequence(&self, table: &str) -> CatalogResult<Option<String>> {
        Ok(self.get(table)?.sequence.clone())
    }

    async fn unique_indexes(
        &self,
        table: &str,
    ) -> CatalogResult<BTreeMap<String, BTreeSet<String>>> {
        Ok(self
            .get(table)?
            .unique_indexes
            .iter()
            .map(|(name, cols)| (name.clone(), cols.iter().cloned().collect()))
            .collect())
    }

    async fn foreign_key_names(&self, table: &str) -> CatalogResult<Vec<String>> {
        Ok(self
            .get(table)?
            .foreign_keys
            .iter()
            .map(|(name, _, _)| name.clone())
            .collect())
    }

    async fn foreign_key_columns(
        &self,
        table: &str,
        constraint: &str,
    ) -> CatalogResult<BTreeMap<String, String>> {
        Ok(self
            .get(table)?
            .foreign_keys
            .iter()
            .find(|(name, _, _)| name == constraint)
            .map(|(_, _, mapping)| mapping.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn foreign_key_referenced_table(
        &self,
        table: &str,
        constraint: &str,
    ) -> CatalogResult<String> {
        Ok(self
            .get(table)?
            .foreign_keys
            .iter()
            .find(|(name, _, _)| name == constraint)
            .map(|(_, target, _)| target.clone())
            .unwrap_or_default())
    }
}

fn cols(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

fn mapping(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

/// A channel schema slice: rhnchannel has a genuine label key, the family
/// membership table's only unique index is two foreign surrogate ids.
fn channel_fixture() -> FixtureCatalog {
    let mut catalog = FixtureCatalog::default();

    catalog.add(
        "rhnchannel",
        FixtureTable {
            columns: cols(&["id", "label", "name", "channel_arch_id"]),
            primary_key: cols(&["id"]),
            sequence: Some("rhn_channel_id_seq".to_string()),
            unique_indexes: vec![
                ("rhn_channel_label_uq".to_string(), cols(&["label"])),
                ("rhn_channel_name_uq".to_string(), cols(&["name"])),
            ],
            foreign_keys: vec![(
                "rhn_channel_caid_fk".to_string(),
                "rhnchannelarch".to_string(),
                mapping(&[("channel_arch_id", "id")]),
            )],
        },
    );

    catalog.add(
        "rhnchannelfamily",
        FixtureTable {
            columns: cols(&["id", "name", "label"]),
            primary_key: cols(&["id"]),
            sequence: Some("rhn_channel_family_id_seq".to_string()),
            unique_indexes: vec![(
                "rhn_channel_family_label_uq".to_string(),
                cols(&["label"]),
            )],
            foreign_keys: vec![],
        },
    );

    catalog.add(
        "rhnchannelfamilymembers",
        FixtureTable {
            columns: cols(&["channel_id", "channel_family_id", "created", "modified"]),
            primary_key: vec![],
            sequence: None,
            unique_indexes: vec![(
                "rhn_cfm_cid_fid_uq".to_string(),
                cols(&["channel_id", "channel_family_id"]),
            )],
            foreign_keys: vec![
                (
                    "rhn_cfm_cid_fk".to_string(),
                    "rhnchannel".to_string(),
                    mapping(&[("channel_id", "id")]),
                ),
                (
                    "rhn_cfm_fid_fk".to_string(),
                    "rhnchannelfamily".to_string(),
                    mapping(&[("channel_family_id", "id")]),
                ),
            ],
        },
    );

    // dictionary table: natural-key primary key, no sequence
    catalog.add(
        "rhnchannelarch",
        FixtureTable {
            columns: cols(&["id", "label", "name"]),
            primary_key: cols(&["id"]),
            sequence: None,
            unique_indexes: vec![("rhn_carch_label_uq".to_string(), cols(&["label"]))],
            foreign_keys: vec![],
        },
    );

    catalog
}

fn by_name<'a>(tables: &'a [Table], name: &str) -> &'a Table {
    tables
        .iter()
        .find(|t| t.name == name)
        .unwrap_or_else(|| panic!("table {name} missing from result"))
}

#[tokio::test]
async fn label_index_survives_correction() {
    let tables = SchemaAssembler::new(channel_fixture())
        .assemble()
        .await
        .expect("assembly failed");

    let channel = by_name(&tables, "rhnchannel");
    assert_eq!(
        channel.main_unique_index,
        Some("rhn_channel_label_uq".to_string())
    );
    assert!(channel.has_surrogate_key());
}

#[tokio::test]
async fn foreign_surrogate_index_is_revoked() {
    let tables = SchemaAssembler::new(channel_fixture())
        .assemble()
        .await
        .expect("assembly failed");

    let members = by_name(&tables, "rhnchannelfamilymembers");
    // provisional election picked the only index, correction cleared it
    assert_eq!(members.main_unique_index, None);
    assert_eq!(members.unique_indexes.len(), 1);
}

#[tokio::test]
async fn reference_to_natural_primary_key_is_kept() {
    let mut catalog = channel_fixture();
    // rhnchannel's label index does not touch channel_arch_id, so the
    // reference into rhnchannelarch never threatens the election; make an
    // index that does and point it at the non-surrogate dictionary table.
    catalog.tables.get_mut("rhnchannel").expect("fixture").unique_indexes = vec![(
        "rhn_channel_arch_uq".to_string(),
        cols(&["channel_arch_id"]),
    )];

    let tables = SchemaAssembler::new(catalog)
        .assemble()
        .await
        .expect("assembly failed");

    // rhnchannelarch has no primary-key sequence, so no revocation
    let channel = by_name(&tables, "rhnchannel");
    assert_eq!(
        channel.main_unique_index,
        Some("rhn_channel_arch_uq".to_string())
    );
}

#[tokio::test]
async fn result_preserves_target_order() {
    let tables = SchemaAssembler::new(channel_fixture())
        .assemble()
        .await
        .expect("assembly failed");

    let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "rhnchannel",
            "rhnchannelfamily",
            "rhnchannelfamilymembers",
            "rhnchannelarch",
        ]
    );
}

#[tokio::test]
async fn unique_index_columns_are_table_columns() {
    let tables = SchemaAssembler::new(channel_fixture())
        .assemble()
        .await
        .expect("assembly failed");

    for table in &tables {
        let columns: BTreeSet<&str> = table.columns.iter().map(String::as_str).collect();
        for index in table.unique_indexes.values() {
            assert!(
                index.columns.iter().all(|c| columns.contains(c.as_str())),
                "index {} of {} covers unknown columns",
                index.name,
                table.name
            );
        }
    }
}

#[tokio::test]
async fn provider_failure_aborts_the_run() {
    let mut catalog = channel_fixture();
    catalog.fail_on = Some("rhnchannelfamily".to_string());

    let result = SchemaAssembler::new(catalog).assemble().await;

    let err = result.expect_err("expected fail-fast abort");
    assert!(matches!(err, CatalogError::Provider(_)));
    assert!(err.to_string().contains("rhnchannelfamily"));
}

#[tokio::test]
async fn model_serializes_for_downstream_tooling() {
    let tables = SchemaAssembler::new(channel_fixture())
        .assemble()
        .await
        .expect("assembly failed");

    let json = serde_json::to_string(&tables).expect("serialization failed");
    let parsed: Vec<Table> = serde_json::from_str(&json).expect("deserialization failed");
    assert_eq!(parsed, tables);
}
