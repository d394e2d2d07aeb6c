use indexmap::IndexMap;
use std::time::Duration;

use super::{Config, OrchestratorBox};

/// Creates a new test configuration.
pub fn new_test_config() -> Config {
    let mut registries = IndexMap::new();
    registries.insert(
        "folio".to_string(),
        vec!["mod-users-19.3.0".to_string(), "edge-patron-1.0.0".to_string()],
    );
    registries.insert("eureka".to_string(), vec!["mgr-tenants-1.0.0".to_string()]);

    let mut modules = IndexMap::new();
    modules.insert("mod-users".to_string(), None);
    modules.insert("edge-patron".to_string(), None);
    modules.insert("mgr-tenants".to_string(), None);

    let mut module_env = IndexMap::new();
    module_env.insert("KAFKA_HOST".to_string(), serde_json::json!("kafka.eureka"));
    module_env.insert("KAFKA_PORT".to_string(), serde_json::json!(9092));

    Config {
        orchestrator: OrchestratorBox {
            env: super::TEST.to_string(),
            profile: "combined".to_string(),
            logs: Some(super::Logs {
                level: Some("debug".to_string()),
            }),
            runtime: super::Runtime {
                host: "http://127.0.0.1:2375".to_string(),
                api_version: None,
                network: "eureka".to_string(),
                platform: None,
                timeouts: super::Timeouts {
                    list: Duration::from_secs(1),
                    pull: Duration::from_secs(1),
                    deploy: Duration::from_secs(1),
                    undeploy: Duration::from_secs(1),
                    logs: Duration::from_secs(1),
                },
            },
            ports: super::Ports {
                start: 30000,
                end: 30999,
                check_host: false,
            },
            readiness: super::Readiness {
                max_retries: 3,
                wait: Duration::from_millis(1),
                timeout: Duration::from_millis(200),
            },
            mesh: super::Mesh::default(),
            namespaces: super::Namespaces::default(),
            sidecar: super::Sidecar {
                image: Some("folio-module-sidecar".to_string()),
                version: Some("3.0.0".to_string()),
            },
            discovery: super::Discovery {
                url: Some("http://127.0.0.1:9901".to_string()),
                timeout: Duration::from_secs(1),
            },
            vault: super::Vault {
                container: Some("vault".to_string()),
                url: "http://vault.eureka:8200".to_string(),
            },
            module_env,
            sidecar_env: IndexMap::new(),
            registries,
            modules,
        },
    }
}
