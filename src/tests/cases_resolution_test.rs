// Scenario tests from YAML configuration to running containers.

use crate::config::Config;
use crate::support::{FakeRuntime, Harness, RecordingRegistrar, ScriptedProbe};

const CONFIG: &str = r#"
orchestrator:
  env: test
  profile: dev
  ports:
    start: 32000
    end: 32099
    check_host: false
  readiness:
    max_retries: 2
    wait: 1ms
    timeout: 100ms
  sidecar:
    image: folio-module-sidecar
    version: 3.0.0
  module_env:
    DB_HOST: postgres.eureka
    DB_PORT: 5432
  registries:
    folio:
      - mod-users-19.3.0
      - mod-notes-5.2.0
      - mod-inventory-20.1.0
    eureka:
      - mgr-applications-2.0.0
  modules:
    mod-users:
      port: 32050
      env:
        log_level: debug
    mod-notes:
      deploy_module: false
    mod-inventory:
      deploy_sidecar: false
    mgr-applications: ~
"#;

fn harness() -> Harness {
    let cfg = Config::from_yaml(CONFIG).unwrap();
    Harness::build(cfg, FakeRuntime::new(), ScriptedProbe::healthy(), RecordingRegistrar::new())
}

fn env_of(h: &Harness, container: &str) -> Vec<String> {
    h.runtime.find_created(container).unwrap().config.env
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_configured_modules_reach_the_runtime() {
    let h = harness();
    let containers = h.containers(h.specs(), false);

    let result = h.orchestrator().deploy(containers.clone()).await.unwrap();

    assert_eq!(result.port("mod-users"), Some(32050));
    assert!(result.port("mod-notes").is_none());
    assert!(result.port("mod-inventory").is_some());

    let mut created = h.runtime.created_names();
    created.sort();
    assert_eq!(
        created,
        vec![
            "eureka-dev-mod-inventory",
            "eureka-dev-mod-users",
            "eureka-dev-mod-users-sc",
        ]
    );

    let users = h.runtime.find_created("eureka-dev-mod-users").unwrap();
    assert_eq!(users.host_config.port_bindings["8081/tcp"][0].host_port, "32050");

    let env = env_of(&h, "eureka-dev-mod-users");
    assert!(env.contains(&"DB_HOST=postgres.eureka".to_string()));
    assert!(env.contains(&"DB_PORT=5432".to_string()));
    assert!(env.contains(&"LOG_LEVEL=debug".to_string()));

    h.orchestrator().await_readiness(&containers).await.unwrap();
    assert_eq!(h.probe.count("http://localhost:32050/admin/health"), 1);
}

#[tokio::test]
async fn test_explicit_port_is_never_allocated_again() {
    let h = harness();
    let specs = h.specs();

    for (name, spec) in &specs {
        if name != "mod-users" {
            assert!(!spec.host_ports().contains(&32050), "{} got the reserved port", name);
        }
    }
    assert!(h.ports.issued().contains(&32050));
    assert!(h.ports.issued().iter().all(|p| (32000..=32099).contains(p)));
}

#[test]
fn test_invalid_port_range_is_rejected() {
    let yaml = CONFIG.replace("start: 32000", "start: 33000");
    assert!(Config::from_yaml(&yaml).is_err());
}
