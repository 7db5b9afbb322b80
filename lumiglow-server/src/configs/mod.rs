pub mod schema;
pub mod settings;
pub mod storage;

pub use schema::SchemaManager;
pub use settings::{
    DEFAULT_MAX_BODY_BYTES, Database, Generation, Logger, ObjectStorage, Pipeline, Server, Settings,
};
pub use storage::Storage;
