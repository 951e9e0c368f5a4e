pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn line() -> String {
    format!("kindctl version: {VERSION}")
}

pub fn run() {
    println!("{}", line());
}
