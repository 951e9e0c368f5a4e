pub mod destroy;
pub mod init;
pub mod update;
pub mod version;

// These modules should not do much and act mostly as a thunk between the
// CLI and the engine.
