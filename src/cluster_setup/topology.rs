use anyhow::{Context, Result};
use serde::Serialize;

use crate::configparser::config::ClusterSpec;

/// kind cluster descriptor: one control-plane node that publishes the
/// ingress ports on the host, plus the worker nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topology {
    kind: &'static str,
    api_version: &'static str,
    pub name: String,
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub role: Role,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extra_port_mappings: Vec<PortMapping>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    ControlPlane,
    Worker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMapping {
    pub container_port: u16,
    pub host_port: u16,
}

impl Topology {
    pub fn for_cluster(spec: &ClusterSpec) -> Self {
        let control_plane = Node {
            role: Role::ControlPlane,
            extra_port_mappings: [80, 443]
                .into_iter()
                .map(|port| PortMapping {
                    container_port: port,
                    host_port: port,
                })
                .collect(),
        };

        // a cluster without workers has nowhere to schedule the ingress controller
        let workers = spec.worker_nodes.max(1);
        let nodes = std::iter::once(control_plane)
            .chain((0..workers).map(|_| Node {
                role: Role::Worker,
                extra_port_mappings: vec![],
            }))
            .collect();

        Topology {
            kind: "Cluster",
            api_version: "kind.x-k8s.io/v1alpha4",
            name: spec.name.clone(),
            nodes,
        }
    }

    fn count(&self, role: Role) -> usize {
        self.nodes.iter().filter(|n| n.role == role).count()
    }

    pub fn control_planes(&self) -> usize {
        self.count(Role::ControlPlane)
    }

    pub fn workers(&self) -> usize {
        self.count(Role::Worker)
    }

    /// Node names kind assigns to the workers: `<name>-worker`,
    /// `<name>-worker2`, `<name>-worker3`, ...
    pub fn worker_names(&self) -> Vec<String> {
        (1..=self.workers())
            .map(|i| match i {
                1 => format!("{}-worker", self.name),
                n => format!("{}-worker{n}", self.name),
            })
            .collect()
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yml::to_string(self).context("could not serialize kind cluster config")
    }
}
