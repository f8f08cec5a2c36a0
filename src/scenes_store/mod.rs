mod models;
mod schema;
mod store;
mod trait_def;
mod validation;

pub use models::*;
pub use store::SqliteScenesStore;
#[cfg(feature = "mock")]
pub use trait_def::MockSceneStore;
pub use trait_def::SceneStore;
pub use validation::ValidationError;
