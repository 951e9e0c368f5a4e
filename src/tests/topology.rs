use pretty_assertions::assert_eq;

use crate::cluster_setup::topology::*;
use crate::configparser::config::ClusterSpec;

fn spec(workers: u32) -> ClusterSpec {
    ClusterSpec {
        name: "dev".to_string(),
        worker_nodes: workers,
    }
}

#[test]
fn one_control_plane_with_ingress_ports() {
    let topology = Topology::for_cluster(&spec(1));

    assert_eq!(topology.control_planes(), 1);
    assert_eq!(topology.nodes[0].role, Role::ControlPlane);
    assert_eq!(
        topology.nodes[0].extra_port_mappings,
        vec![
            PortMapping {
                container_port: 80,
                host_port: 80
            },
            PortMapping {
                container_port: 443,
                host_port: 443
            },
        ]
    );
}

#[test]
/// Zero workers is coerced to one
fn zero_workers() {
    let topology = Topology::for_cluster(&spec(0));

    assert_eq!(topology.workers(), 1);
    assert_eq!(topology.worker_names(), vec!["dev-worker"]);
}

#[test]
fn three_workers() {
    let topology = Topology::for_cluster(&spec(3));

    assert_eq!(topology.nodes.len(), 4);
    assert_eq!(topology.workers(), 3);
    assert_eq!(
        topology.worker_names(),
        vec!["dev-worker", "dev-worker2", "dev-worker3"]
    );
}

#[test]
fn yaml_descriptor() {
    let yaml = Topology::for_cluster(&spec(2)).to_yaml().unwrap();
    let parsed: serde_yml::Value = serde_yml::from_str(&yaml).unwrap();

    assert_eq!(parsed["kind"].as_str(), Some("Cluster"));
    assert_eq!(parsed["apiVersion"].as_str(), Some("kind.x-k8s.io/v1alpha4"));
    assert_eq!(parsed["name"].as_str(), Some("dev"));

    let nodes = parsed["nodes"].as_sequence().unwrap();
    let roles: Vec<_> = nodes.iter().map(|n| n["role"].as_str().unwrap()).collect();
    assert_eq!(roles, vec!["control-plane", "worker", "worker"]);

    let mappings = nodes[0]["extraPortMappings"].as_sequence().unwrap();
    assert_eq!(mappings.len(), 2);
    assert_eq!(mappings[1]["containerPort"].as_u64(), Some(443));
    assert_eq!(mappings[1]["hostPort"].as_u64(), Some(443));
    assert!(nodes[1].get("extraPortMappings").is_none());
}
