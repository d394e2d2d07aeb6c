#[cfg(test)]
mod tests {
    use crate::model::RegistryModule;

    #[test]
    fn test_module_id_with_version() {
        let module = RegistryModule::from_id("mod-users-19.3.0");
        assert_eq!(module.id(), "mod-users-19.3.0");
        assert_eq!(module.name(), "mod-users");
        assert_eq!(module.version(), Some("19.3.0"));
        assert_eq!(module.sidecar_name(), "mod-users-sc");
        assert!(!module.is_management());
        assert!(!module.is_edge());
    }

    #[test]
    fn test_edge_module_sidecar_name_equals_module_name() {
        let module = RegistryModule::from_id("edge-patron-1.0.0");
        assert_eq!(module.name(), "edge-patron");
        assert_eq!(module.version(), Some("1.0.0"));
        assert_eq!(module.sidecar_name(), "edge-patron");
        assert!(module.is_edge());
    }

    #[test]
    fn test_snapshot_version_kept_whole() {
        let module = RegistryModule::from_id("mod-inventory-storage-27.1.0-SNAPSHOT.612");
        assert_eq!(module.name(), "mod-inventory-storage");
        assert_eq!(module.version(), Some("27.1.0-SNAPSHOT.612"));
    }

    #[test]
    fn test_digits_inside_name_are_not_a_version() {
        let module = RegistryModule::from_id("mod-oai-pmh2-3.14.1");
        assert_eq!(module.name(), "mod-oai-pmh2");
        assert_eq!(module.version(), Some("3.14.1"));
    }

    #[test]
    fn test_module_id_without_version() {
        let module = RegistryModule::from_id("mgr-tenants");
        assert_eq!(module.name(), "mgr-tenants");
        assert_eq!(module.version(), None);
        assert!(module.is_management());
    }
}
