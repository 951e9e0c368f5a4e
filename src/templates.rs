// Embed Kubernetes manifest skeletons into the binary. Only the values
// passed at render time vary; the structure is fixed.

pub static INGRESS: &str = include_str!("../asset_files/templates/ingress.yaml.j2");

pub static ADMINER: &str = include_str!("../asset_files/templates/adminer.yaml.j2");

pub static MAILPIT: &str = include_str!("../asset_files/templates/mailpit.yaml.j2");
