use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use serde_yml::Value;

use super::fake::{workspace, FakeRunner};
use crate::addons::mailpit::{render_manifest, ui_auth};
use crate::addons::*;
use crate::configparser::config::MailpitSpec;
use crate::configparser::{AddonKind, ClusterConfig};

fn leftover_yaml(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".yaml"))
        .collect()
}

fn ingress(manifest: &str) -> Value {
    serde_yml::from_str(manifest).unwrap()
}

fn backend(ingress: &Value) -> (String, u64) {
    let backend = &ingress["spec"]["rules"][0]["http"]["paths"][0]["backend"]["service"];
    (
        backend["name"].as_str().unwrap().to_string(),
        backend["port"]["number"].as_u64().unwrap(),
    )
}

#[test]
fn every_kind_has_its_installer() {
    for kind in AddonKind::ALL {
        assert_eq!(installer(kind).kind(), kind);
    }
}

#[test]
fn set_values_are_escaped() {
    assert_eq!(set_value("auth.username", "admin"), "auth.username=admin");
    assert_eq!(
        set_value("auth.password", r"a,b\c"),
        r"auth.password=a\,b\\c"
    );
}

#[test]
fn route_manifest() {
    let manifest = render_route(&Route {
        addon: "redis",
        host: "redis.local",
        namespace: "data",
        service: "redis-master",
        port: 6379,
        backend_https: false,
    })
    .unwrap();
    let doc = ingress(&manifest);

    assert_eq!(doc["kind"].as_str(), Some("Ingress"));
    assert_eq!(doc["apiVersion"].as_str(), Some("networking.k8s.io/v1"));
    assert_eq!(doc["metadata"]["name"].as_str(), Some("redis-ingress"));
    assert_eq!(doc["metadata"]["namespace"].as_str(), Some("data"));
    assert!(doc["metadata"].get("annotations").is_none());
    assert_eq!(doc["spec"]["ingressClassName"].as_str(), Some("nginx"));
    assert_eq!(doc["spec"]["rules"][0]["host"].as_str(), Some("redis.local"));
    assert_eq!(
        doc["spec"]["rules"][0]["http"]["paths"][0]["pathType"].as_str(),
        Some("Prefix")
    );
    assert_eq!(backend(&doc), ("redis-master".to_string(), 6379));
}

#[test]
fn postgres_chart_and_route() {
    let dir = tempfile::tempdir().unwrap();
    let runner = FakeRunner::with_all_tools();
    let ws = workspace(&runner, dir.path());

    let mut config = ClusterConfig::default();
    config.postgres.enabled = true;
    config.postgres.password = "pa,ss".to_string();

    installer(AddonKind::Postgres).install(&ws, &config).unwrap();

    let lines = runner.lines();
    assert_eq!(lines[0], "helm repo add bitnami https://charts.bitnami.com/bitnami");
    assert_eq!(lines[1], "helm repo update");
    assert_eq!(
        lines[2],
        "helm upgrade --install postgres bitnami/postgresql \
         --namespace default --create-namespace --kube-context kind-kind-cluster \
         --set image.tag=16 \
         --set global.postgresql.auth.username=postgres \
         --set global.postgresql.auth.password=pa\\,ss \
         --set global.postgresql.auth.postgresPassword=pa\\,ss \
         --set global.postgresql.auth.database=postgres"
    );
    assert!(lines[3].starts_with("kubectl --context kind-kind-cluster apply -f "));
    assert_eq!(lines.len(), 4);

    let route = ingress(&runner.applied()[0]);
    assert_eq!(route["spec"]["rules"][0]["host"].as_str(), Some("postgres.local"));
    assert_eq!(backend(&route), ("postgres-postgresql".to_string(), 5432));

    assert!(leftover_yaml(dir.path()).is_empty());
}

#[test]
/// "helm repo add" failing usually means the repo is already there
fn repo_add_failure_is_tolerated() {
    let dir = tempfile::tempdir().unwrap();
    let runner = FakeRunner::with_all_tools();
    runner.fail_on("helm repo add");
    let ws = workspace(&runner, dir.path());

    let mut config = ClusterConfig::default();
    config.redis.enabled = true;

    installer(AddonKind::Redis).install(&ws, &config).unwrap();

    assert!(runner.ran("helm upgrade --install redis bitnami/redis"));
    assert!(runner.ran("helm upgrade --install redis bitnami/redis --namespace default --create-namespace --kube-context kind-kind-cluster --set architecture=standalone"));
    assert_eq!(backend(&ingress(&runner.applied()[0])), ("redis-master".to_string(), 6379));
}

#[test]
fn repo_update_failure_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let runner = FakeRunner::with_all_tools();
    runner.fail_on("helm repo update");
    let ws = workspace(&runner, dir.path());

    let mut config = ClusterConfig::default();
    config.rabbitmq.enabled = true;

    let err = installer(AddonKind::RabbitMq)
        .install(&ws, &config)
        .unwrap_err();

    assert!(format!("{err:#}").contains("failed to update Helm repositories"));
    assert!(!runner.ran("helm upgrade"));
    assert!(runner.applied().is_empty());
}

#[test]
fn rabbitmq_routes_management_ui() {
    let dir = tempfile::tempdir().unwrap();
    let runner = FakeRunner::with_all_tools();
    let ws = workspace(&runner, dir.path());

    let mut config = ClusterConfig::default();
    config.rabbitmq.enabled = true;

    installer(AddonKind::RabbitMq).install(&ws, &config).unwrap();

    assert!(runner.ran("helm upgrade --install rabbitmq bitnami/rabbitmq"));
    assert!(runner.lines()[2].ends_with("--set auth.username=admin --set auth.password=admin"));
    assert_eq!(backend(&ingress(&runner.applied()[0])), ("rabbitmq".to_string(), 15672));
}

#[test]
fn pgadmin_uses_runix_repo() {
    let dir = tempfile::tempdir().unwrap();
    let runner = FakeRunner::with_all_tools();
    let ws = workspace(&runner, dir.path());

    let mut config = ClusterConfig::default();
    config.pgadmin.enabled = true;

    installer(AddonKind::PgAdmin).install(&ws, &config).unwrap();

    assert!(runner.ran("helm repo add runix https://helm.runix.net"));
    assert!(runner.ran("helm upgrade --install pgadmin runix/pgadmin4"));
    assert!(runner.lines()[2].contains("--set env.email=admin@example.com"));
    assert_eq!(
        backend(&ingress(&runner.applied()[0])),
        ("pgadmin-pgadmin4".to_string(), 80)
    );
}

#[test]
fn dashboard_manifest_and_https_route() {
    let dir = tempfile::tempdir().unwrap();
    let runner = FakeRunner::with_all_tools();
    let ws = workspace(&runner, dir.path());

    let config = ClusterConfig::default();
    installer(AddonKind::Dashboard).install(&ws, &config).unwrap();

    let applied = runner.applied();
    assert_eq!(applied.len(), 2);
    assert_eq!(
        applied[0],
        "https://raw.githubusercontent.com/kubernetes/dashboard/v2.7.0/aio/deploy/recommended.yaml"
    );

    let route = ingress(&applied[1]);
    assert_eq!(route["metadata"]["namespace"].as_str(), Some("kubernetes-dashboard"));
    assert_eq!(
        route["metadata"]["annotations"]["nginx.ingress.kubernetes.io/backend-protocol"].as_str(),
        Some("HTTPS")
    );
    assert_eq!(route["spec"]["rules"][0]["host"].as_str(), Some("dashboard.local"));
    assert_eq!(backend(&route), ("kubernetes-dashboard".to_string(), 443));
    assert!(!runner.ran("helm"));
}

#[test]
fn adminer_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let runner = FakeRunner::with_all_tools();
    let ws = workspace(&runner, dir.path());

    let mut config = ClusterConfig::default();
    config.adminer.enabled = true;
    config.adminer.namespace = "tools".to_string();

    installer(AddonKind::Adminer).install(&ws, &config).unwrap();

    let applied = runner.applied();
    assert_eq!(applied.len(), 2);
    assert!(applied[0].contains("image: adminer:4.8.1"));
    assert!(applied[0].contains("namespace: \"tools\""));
    assert_eq!(backend(&ingress(&applied[1])), ("adminer".to_string(), 80));
    assert!(leftover_yaml(dir.path()).is_empty());
}

#[test]
fn mailpit_ui_auth_needs_both_halves() {
    let mut spec = MailpitSpec::default();
    assert_eq!(ui_auth(&spec), None);

    spec.username = "mail".to_string();
    assert_eq!(ui_auth(&spec), None);

    spec.password = "p@ss: word".to_string();
    assert_eq!(ui_auth(&spec), Some("mail:p@ss: word".to_string()));
}

#[test]
fn mailpit_manifest() {
    let mut spec = MailpitSpec::default();
    let without_auth = render_manifest(&spec).unwrap();
    assert!(!without_auth.contains("MP_UI_AUTH"));

    spec.username = "mail".to_string();
    spec.password = "p@ss: word".to_string();
    let with_auth = render_manifest(&spec).unwrap();

    let deployment: Value = serde_yml::Deserializer::from_str(&with_auth)
        .map(|de| <Value as serde::Deserialize>::deserialize(de).unwrap())
        .next()
        .unwrap();
    let env = deployment["spec"]["template"]["spec"]["containers"][0]["env"]
        .as_sequence()
        .unwrap();
    let auth = env
        .iter()
        .find(|var| var["name"].as_str() == Some("MP_UI_AUTH"))
        .unwrap();
    assert_eq!(auth["value"].as_str(), Some("mail:p@ss: word"));
}

#[test]
/// Manifest files are removed even when kubectl fails
fn failed_apply_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let runner = FakeRunner::with_all_tools();
    runner.fail_on("kubectl");
    let ws = workspace(&runner, dir.path());

    let mut config = ClusterConfig::default();
    config.mailpit.enabled = true;

    let err = installer(AddonKind::Mailpit)
        .install(&ws, &config)
        .unwrap_err();

    assert!(format!("{err:#}").contains("failed to deploy Mailpit"));
    assert!(leftover_yaml(dir.path()).is_empty());
}
