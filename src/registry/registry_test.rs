#[cfg(test)]
mod tests {
    use crate::config::{new_test_config, ConfigTrait, Namespaces};
    use crate::registry::{image_reference, ConfiguredNamespace, ImageNamespace, RegistrySource, StaticRegistry};

    #[test]
    fn test_namespace_by_version() {
        let ns = ConfiguredNamespace::new(&Namespaces::default());
        assert_eq!(ns.namespace(Some("19.3.0")), "folioorg");
        assert_eq!(ns.namespace(Some("19.4.0-SNAPSHOT.312")), "folioci");
        assert_eq!(ns.namespace(Some("19.4.0-snapshot")), "folioci");
        assert_eq!(ns.namespace(None), "folioorg");
    }

    #[test]
    fn test_override_wins_and_blank_override_is_ignored() {
        let ns = ConfiguredNamespace::new(&Namespaces {
            override_namespace: Some("my-ns".to_string()),
            ..Namespaces::default()
        });
        assert_eq!(ns.namespace(Some("1.0.0-SNAPSHOT")), "my-ns");

        let ns = ConfiguredNamespace::new(&Namespaces {
            override_namespace: Some(" ".to_string()),
            ..Namespaces::default()
        });
        assert_eq!(ns.namespace(Some("1.0.0")), "folioorg");
    }

    #[test]
    fn test_image_reference() {
        assert_eq!(image_reference("folioorg", "mod-users", Some("19.3.0")), "folioorg/mod-users:19.3.0");
        assert_eq!(image_reference("", "folio-module-sidecar", None), "folio-module-sidecar:latest");
        assert_eq!(image_reference("folioci/", "mod-users", Some("")), "folioci/mod-users:latest");
    }

    #[test]
    fn test_static_registry_parses_ids_in_order() {
        let cfg = new_test_config();
        let modules = StaticRegistry::from_ids(cfg.registries()).modules();

        assert_eq!(modules.keys().collect::<Vec<_>>(), vec!["folio", "eureka"]);
        let folio = &modules["folio"];
        assert_eq!(folio[0].name(), "mod-users");
        assert_eq!(folio[0].version(), Some("19.3.0"));
        assert_eq!(folio[1].sidecar_name(), "edge-patron");
        assert!(modules["eureka"][0].is_management());
    }
}
