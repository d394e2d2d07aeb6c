#[cfg(test)]
mod tests {
    use crate::config::new_test_config;
    use crate::model::{Containers, ModulePair, RegistryModule};
    use crate::pairing::{Flow, PairingError, Stage};
    use crate::readiness::ReadinessError;
    use crate::support::{Call, CreatedContainer, FakeRuntime, Harness, RecordingRegistrar, ScriptedProbe};

    const MODULE: &str = "eureka-combined-mod-users";
    const SIDECAR: &str = "eureka-combined-mod-users-sc";

    fn running_pair() -> FakeRuntime {
        FakeRuntime::new()
            .with_container(MODULE, "folioorg/mod-users:19.3.0")
            .with_container(SIDECAR, "folioorg/folio-module-sidecar:3.0.0")
    }

    fn env_value<'a>(container: &'a CreatedContainer, key: &str) -> Option<&'a str> {
        let prefix = format!("{}=", key);
        container.config.env.iter().find_map(|e| e.strip_prefix(prefix.as_str()))
    }

    fn bound_port(container: &CreatedContainer) -> Option<&str> {
        container
            .host_config
            .port_bindings
            .get("8081/tcp")
            .and_then(|b| b.first())
            .map(|b| b.host_port.as_str())
    }

    #[test]
    fn test_custom_flow_skips_module_redeploy() {
        assert!(!Flow::CustomSidecar.stages().contains(&Stage::RedeployModule));
        assert!(Flow::DefaultPair.stages().contains(&Stage::RedeployModule));
        assert_eq!(Flow::DefaultPair.stages().first(), Some(&Stage::Start));
        assert_eq!(Flow::DefaultPair.stages().last(), Some(&Stage::Done));
        assert_eq!(Stage::UndeployExistingPair.to_string(), "undeploy_existing_pair");
    }

    #[tokio::test]
    async fn test_intercept_redeploys_pair_on_fresh_ports() {
        let h = Harness::new(running_pair());
        let pair = h.pair(h.containers(h.specs(), false), "mod-users");
        let old = pair.ports();

        let pair = h.pairing().intercept(pair).await.unwrap();

        let ports = pair.ports();
        for port in [ports.module_server, ports.module_debug, ports.sidecar_server, ports.sidecar_debug] {
            assert_ne!(port, 0);
            assert!(![old.module_server, old.module_debug, old.sidecar_server, old.sidecar_debug].contains(&port));
        }

        assert_eq!(h.runtime.count("remove"), 2, "existing module and sidecar removed");
        assert_eq!(h.runtime.created_names(), vec![MODULE, SIDECAR]);

        let module = h.runtime.find_created(MODULE).unwrap();
        let sidecar = h.runtime.find_created(SIDECAR).unwrap();
        assert_eq!(bound_port(&module), Some(ports.module_server.to_string().as_str()));
        assert_eq!(bound_port(&sidecar), Some(ports.sidecar_server.to_string().as_str()));

        let registrations = h.registrar.registrations();
        assert_eq!(registrations.len(), 1);
        assert_eq!(registrations[0].module_id, "mod-users-19.3.0");
        assert_eq!(registrations[0].location, "http://mod-users-sc.eureka:8081");

        let module_health = format!("http://localhost:{}/admin/health", ports.module_server);
        let sidecar_health = format!("http://localhost:{}/admin/health", ports.sidecar_server);
        assert_eq!(h.probe.count(&module_health), 1);
        assert_eq!(h.probe.count(&sidecar_health), 1);
    }

    #[tokio::test]
    async fn test_existing_pair_is_removed_before_redeploy() {
        let h = Harness::new(running_pair());
        let pair = h.pair(h.containers(h.specs(), false), "mod-users");

        h.pairing().intercept(pair).await.unwrap();

        let calls = h.runtime.calls();
        let last_remove = calls.iter().rposition(|c| c.op() == "remove").unwrap();
        let first_create = calls.iter().position(|c| c.op() == "create").unwrap();
        assert!(last_remove < first_create);
    }

    #[tokio::test]
    async fn test_intercept_with_module_url_redeploys_only_sidecar() {
        let h = Harness::new(running_pair());
        let pair = h
            .pair(h.containers(h.specs(), false), "mod-users")
            .with_module_url(Some("http://host.docker.internal:9130".to_string()));
        let before = pair.ports();

        let after = h.pairing().intercept(pair).await.unwrap().ports();

        assert_eq!(after.module_server, before.module_server);
        assert_eq!(after.module_debug, before.module_debug);
        assert_eq!(after.sidecar_server, before.sidecar_server);
        assert_ne!(after.sidecar_debug, before.sidecar_debug);
        assert_eq!(h.ports.issued().len(), 7, "six from resolution and one fresh debug port");

        assert_eq!(h.runtime.created_names(), vec![SIDECAR]);
        let sidecar = h.runtime.find_created(SIDECAR).unwrap();
        assert_eq!(env_value(&sidecar, "MODULE_URL"), Some("http://host.docker.internal:9130"));
        assert_eq!(env_value(&sidecar, "SIDECAR_URL"), Some("http://mod-users-sc.eureka:8081"));

        let module_health = format!("http://localhost:{}/admin/health", after.module_server);
        assert_eq!(h.probe.count(&module_health), 1);
    }

    #[tokio::test]
    async fn test_sidecar_url_override_is_registered() {
        let h = Harness::new(running_pair());
        let pair = h
            .pair(h.containers(h.specs(), false), "mod-users")
            .with_module_url(Some("http://host.docker.internal:9130".to_string()))
            .with_sidecar_url(Some("http://host.docker.internal:19130".to_string()));

        h.pairing().intercept(pair).await.unwrap();

        assert_eq!(h.registrar.registrations()[0].location, "http://host.docker.internal:19130");
    }

    #[tokio::test]
    async fn test_restore_drops_overrides() {
        let h = Harness::new(running_pair());
        let pair = h
            .pair(h.containers(h.specs(), false), "mod-users")
            .with_module_url(Some("http://host.docker.internal:9130".to_string()))
            .with_sidecar_url(Some("http://host.docker.internal:19130".to_string()));

        let pair = h.pairing().restore(pair).await.unwrap();

        assert_eq!(pair.module_url(), None);
        assert_eq!(pair.sidecar_url(), None);
        assert_eq!(h.runtime.created_names(), vec![MODULE, SIDECAR]);
        let sidecar = h.runtime.find_created(SIDECAR).unwrap();
        assert_eq!(env_value(&sidecar, "MODULE_URL"), Some("http://mod-users.eureka:8081"));
        assert_eq!(h.registrar.registrations()[0].location, "http://mod-users-sc.eureka:8081");
    }

    #[tokio::test]
    async fn test_upgrade_bumps_patch_version() {
        let h = Harness::new(running_pair());
        let pair = h.pair(h.containers(h.specs(), false), "mod-users");

        let pair = h.pairing().upgrade(pair).await.unwrap();

        assert_eq!(pair.version(), Some("19.3.1"));
        assert_eq!(pair.id(), "mod-users-19.3.1");
        assert!(h
            .runtime
            .calls()
            .contains(&Call::Pull("folioorg/mod-users:19.3.1".to_string())));
        let sidecar = h.runtime.find_created(SIDECAR).unwrap();
        assert_eq!(env_value(&sidecar, "MODULE_VERSION"), Some("19.3.1"));

        let registration = &h.registrar.registrations()[0];
        assert_eq!(registration.module_id, "mod-users-19.3.1");
        assert_eq!(registration.version.as_deref(), Some("19.3.1"));
    }

    #[tokio::test]
    async fn test_upgrade_without_version_fails() {
        let h = Harness::new(FakeRuntime::new());
        let spec = h.resolver().resolve("mod-notes", None).unwrap();
        let containers = Containers::builder("combined")
            .registry("folio", vec![RegistryModule::from_id("mod-notes")])
            .spec("mod-notes", spec)
            .build();
        let pair = ModulePair::from_containers(containers.into(), "mod-notes").unwrap();

        let err = h.pairing().upgrade(pair).await.unwrap_err();

        assert!(matches!(err, PairingError::MissingVersion { ref module } if module == "mod-notes"));
        assert!(h.runtime.calls().is_empty());
    }

    #[tokio::test]
    async fn test_discovery_failure_aborts_before_redeploy() {
        let h = Harness::build(
            new_test_config(),
            running_pair(),
            ScriptedProbe::healthy(),
            RecordingRegistrar::failing(),
        );
        let pair = h.pair(h.containers(h.specs(), false), "mod-users");

        let err = h.pairing().intercept(pair).await.unwrap_err();

        assert!(matches!(err, PairingError::Discovery(_)));
        assert_eq!(h.runtime.count("create"), 0);
        assert_eq!(h.probe.total(), 0);
        assert!(h.runtime.container_names().is_empty(), "existing pair was already undeployed");
    }

    #[tokio::test]
    async fn test_sidecar_redeploy_failure_is_reported() {
        let h = Harness::new(running_pair().fail_on("create", SIDECAR));
        let pair = h.pair(h.containers(h.specs(), false), "mod-users");

        let err = h.pairing().intercept(pair).await.unwrap_err();

        assert!(matches!(err, PairingError::SidecarDeploy { ref sidecar, .. } if sidecar == "mod-users-sc"));
        assert_eq!(h.probe.total(), 0);
    }

    #[tokio::test]
    async fn test_unready_sidecar_fails_verification() {
        // resolution issues 30000..=30005, so the pair lands on 30006..=30009
        let probe = ScriptedProbe::new(200).script("http://localhost:30008/admin/health", &[503, 503, 503]);
        let h = Harness::build(new_test_config(), running_pair(), probe, RecordingRegistrar::new());
        let pair = h.pair(h.containers(h.specs(), false), "mod-users");

        let err = h.pairing().intercept(pair).await.unwrap_err();

        match err {
            PairingError::Readiness(ReadinessError::ModuleNotReady { name, attempts }) => {
                assert_eq!(name, "mod-users-sc");
                assert_eq!(attempts, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_edge_module_pairs_without_sidecar() {
        let h = Harness::new(FakeRuntime::new().with_container("eureka-combined-edge-patron", "edge:1"));
        let pair = h.pair(h.containers(h.specs(), false), "edge-patron");

        let pair = h.pairing().intercept(pair).await.unwrap();

        let ports = pair.ports();
        assert_eq!((ports.sidecar_server, ports.sidecar_debug), (0, 0));
        assert_ne!(ports.module_debug, 0);
        assert_eq!(h.runtime.created_names(), vec!["eureka-combined-edge-patron"]);
        assert_eq!(h.registrar.registrations()[0].location, "http://edge-patron.eureka:8081");
        assert_eq!(h.probe.total(), 1);
    }

    #[tokio::test]
    async fn test_custom_flow_requires_sidecar() {
        let h = Harness::new(FakeRuntime::new());
        let pair = h
            .pair(h.containers(h.specs(), false), "edge-patron")
            .with_module_url(Some("http://host.docker.internal:9130".to_string()));

        let err = h.pairing().intercept(pair).await.unwrap_err();

        assert!(matches!(err, PairingError::NoSidecar { .. }));
        assert!(h.runtime.calls().is_empty());
        assert!(h.registrar.registrations().is_empty());
    }
}
