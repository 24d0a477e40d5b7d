//! Common fixtures for restore engine tests.

#![allow(dead_code)]

use bytes::Bytes;
use std::sync::Arc;

use auditlog_restore_core::snapshot::{artifact_key, metadata_prefix, schema_key};
use auditlog_restore_core::storage::MemoryBackend;
use auditlog_restore_core::{Config, MemoryRemote, RestoreEngine, StorageBackend};

pub const SNAPSHOT_ID: &str = "2024-03-01";

pub const JAN: &str = "2024-01 100 1 100";
pub const FEB: &str = "2024-02 50 101 150";
pub const MAR: &str = "2024-03 20 151 170";

const CONFIG_YAML: &str = r#"
snapshot_id: "2024-03-01"
storage:
  backend: memory
target:
  host: db1.internal
  database: app
  table: audit_log
"#;

/// Configuration pointing at [`SNAPSHOT_ID`]
pub fn test_config() -> Config {
    serde_yaml::from_str(CONFIG_YAML).expect("valid test config")
}

/// Schema dump of the audit table
pub fn schema(auto_increment: u64, dumped_on: &str) -> String {
    format!(
        "-- MySQL dump 10.13  Distrib 8.0.36, for Linux (x86_64)
--
-- Host: localhost    Database: app
/*!40101 SET @saved_cs_client     = @@character_set_client */;
/*!50503 SET character_set_client = utf8mb4 */;
CREATE TABLE `audit_log` (
  `id` bigint unsigned NOT NULL AUTO_INCREMENT,
  `created_at` datetime NOT NULL,
  `action` varchar(128) NOT NULL,
  PRIMARY KEY (`id`)
) ENGINE=InnoDB AUTO_INCREMENT={auto_increment} DEFAULT CHARSET=utf8mb4;
/*!40101 SET character_set_client = @saved_cs_client */;

-- Dump completed on {dumped_on}
"
    )
}

/// The schema stored in the test snapshot
pub fn snapshot_schema() -> String {
    schema(171, "2024-03-01 02:00:01")
}

/// The same table as seen live later on
pub fn live_schema_unchanged() -> String {
    schema(98213, "2024-09-17 11:42:07")
}

/// A live table with an extra column
pub fn live_schema_changed() -> String {
    snapshot_schema().replace(
        "  `action` varchar(128) NOT NULL,\n",
        "  `action` varchar(128) NOT NULL,\n  `ip` varchar(45) DEFAULT NULL,\n",
    )
}

/// Data artifact contents for a subset
pub fn artifact_body(subset_id: &str) -> String {
    format!(
        "INSERT INTO `audit_log` VALUES (1,'{}-01 00:00:00','login');\n",
        subset_id
    )
}

/// Snapshot contents to seed a store with.
pub struct SnapshotFixture {
    pub schema: Option<String>,
    pub metadata: Vec<&'static str>,
    pub artifacts: Vec<&'static str>,
}

impl SnapshotFixture {
    /// Schema plus the given metadata lines, with an artifact for every subset
    pub fn with_subsets(metadata: &[&'static str]) -> Self {
        Self {
            schema: Some(snapshot_schema()),
            metadata: metadata.to_vec(),
            artifacts: metadata
                .iter()
                .map(|&l| l.split_whitespace().next().unwrap_or_default())
                .collect(),
        }
    }

    pub fn without_artifact(mut self, subset_id: &str) -> Self {
        self.artifacts.retain(|a| *a != subset_id);
        self
    }

    pub fn without_schema(mut self) -> Self {
        self.schema = None;
        self
    }

    pub async fn seed(&self) -> Arc<MemoryBackend> {
        let storage = Arc::new(MemoryBackend::new());

        if let Some(schema) = &self.schema {
            storage
                .put(&schema_key(SNAPSHOT_ID), Bytes::from(schema.clone()))
                .await
                .unwrap();
        }
        if !self.metadata.is_empty() {
            let mut text = self.metadata.join("\n");
            text.push('\n');
            storage
                .put(
                    &format!("{}/audit_log.meta", metadata_prefix(SNAPSHOT_ID)),
                    Bytes::from(text),
                )
                .await
                .unwrap();
        }
        for subset_id in &self.artifacts {
            storage
                .put(
                    &artifact_key(SNAPSHOT_ID, subset_id),
                    Bytes::from(artifact_body(subset_id)),
                )
                .await
                .unwrap();
        }

        storage
    }
}

/// Engine over a seeded store and a fake remote
pub fn engine(storage: &Arc<MemoryBackend>, remote: &Arc<MemoryRemote>) -> RestoreEngine {
    engine_with(test_config(), storage, remote)
}

pub fn engine_with(
    config: Config,
    storage: &Arc<MemoryBackend>,
    remote: &Arc<MemoryRemote>,
) -> RestoreEngine {
    RestoreEngine::with_parts(config, storage.clone(), remote.clone()).unwrap()
}

/// Stems of the files imported by the remote, in order
pub fn imported_stems(remote: &MemoryRemote) -> Vec<String> {
    remote.imported().into_iter().map(|(stem, _)| stem).collect()
}
