// Package orchestrator: create payloads for module and sidecar containers.
//
// Shared by batch deploys and pairing flows so both produce identical containers.

use std::sync::Arc;

use crate::config::{Mesh, Sidecar};
use crate::env::{EnvironmentComposer, SidecarIdentity};
use crate::lifecycle::{aliases, naming, network_config, ContainerSpec};
use crate::model::{Containers, ModuleResources, ModuleSpec, RegistryModule};
use crate::registry::{image_reference, ImageNamespace};

/// Address overrides a pairing flow may impose on a sidecar.
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarOverrides<'a> {
    pub module_url: Option<&'a str>,
    pub sidecar_url: Option<&'a str>,
}

pub struct ContainerBlueprints {
    composer: EnvironmentComposer,
    namespace: Arc<dyn ImageNamespace>,
    network: String,
    domain: String,
    platform: Option<String>,
    sidecar: Sidecar,
}

impl ContainerBlueprints {
    pub fn new(
        composer: EnvironmentComposer,
        namespace: Arc<dyn ImageNamespace>,
        network: impl Into<String>,
        mesh: &Mesh,
        platform: Option<String>,
        sidecar: Sidecar,
    ) -> Self {
        Self {
            composer,
            namespace,
            network: network.into(),
            domain: mesh.domain.clone(),
            platform,
            sidecar,
        }
    }

    pub fn composer(&self) -> &EnvironmentComposer {
        &self.composer
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Image of a module at its configured version, else the registry version.
    pub fn module_image(&self, module: &RegistryModule, spec: &ModuleSpec) -> String {
        let version = spec.version.as_deref().or(module.version());
        image_reference(&self.namespace.namespace(version), module.name(), version)
    }

    /// Sidecar image, or `None` when no sidecar image is configured. An image
    /// containing `/` is taken as a full repository path.
    pub fn sidecar_image(&self) -> Option<String> {
        let image = self.sidecar.image.as_deref().map(str::trim).filter(|i| !i.is_empty())?;
        let version = self.sidecar.version.as_deref();
        if image.contains('/') {
            return Some(image_reference("", image, version));
        }
        Some(image_reference(&self.namespace.namespace(version), image, version))
    }

    pub fn module(&self, containers: &Containers, module: &RegistryModule, spec: &ModuleSpec) -> ContainerSpec {
        let env = self.composer.compose_module(containers, module, spec);
        ContainerSpec::builder(
            naming::container_name(containers.profile(), module.name()),
            self.module_image(module, spec),
        )
        .hostname(module.name())
        .env(env)
        .port(spec.private_port, spec.module_server_port)
        .port(self.composer.debug_port(), spec.module_debug_port)
        .binds(&spec.volumes)
        .resources(&spec.resources)
        .network(network_config(&self.network, aliases(module.name(), &self.domain)))
        .platform(self.platform.clone())
        .build()
    }

    pub fn sidecar(
        &self,
        containers: &Containers,
        module: &RegistryModule,
        spec: &ModuleSpec,
        image: &str,
        overrides: SidecarOverrides<'_>,
    ) -> ContainerSpec {
        let identity = SidecarIdentity {
            module_name: module.name(),
            module_version: spec.version.as_deref().or(module.version()),
            module_url: overrides.module_url,
            sidecar_name: module.sidecar_name(),
            sidecar_url: overrides.sidecar_url,
            private_port: spec.private_port,
        };
        let env = self.composer.compose_sidecar(containers, spec, &identity);
        ContainerSpec::builder(
            naming::container_name(containers.profile(), module.sidecar_name()),
            image,
        )
        .hostname(module.sidecar_name())
        .env(env)
        .port(spec.private_port, spec.sidecar_server_port)
        .port(self.composer.debug_port(), spec.sidecar_debug_port)
        .resources(&ModuleResources::default())
        .network(network_config(&self.network, aliases(module.sidecar_name(), &self.domain)))
        .platform(self.platform.clone())
        .build()
    }
}
