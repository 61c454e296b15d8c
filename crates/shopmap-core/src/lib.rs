pub mod app_config;
pub mod config;
pub mod dataset;
pub mod error;
pub mod normalize;
pub mod record;
pub mod schema;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use dataset::{Dataset, DatasetId, DatasetSummary};
pub use error::{ConfigError, MalformedInputError};
pub use normalize::{
    count_by_reason, normalize, normalize_text, parse_table, NormalizeReport, RawRow, RowSkipped,
    SkipReason, Table,
};
pub use record::{Position, PositionError, ShopRecord};
pub use schema::{Field, SchemaMapping};
