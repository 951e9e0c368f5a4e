
mod addons;
mod topology;
mod utils;
