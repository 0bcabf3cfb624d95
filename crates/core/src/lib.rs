#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod recommend;
pub mod settings;
pub mod text;
pub mod time;
pub mod validation;

pub use error::Error;
pub use time::Clock;

pub use recommend::{
    ErrorShare, PerformanceLevel, Priority, ProgressRecommender, Recommendation,
    performance_level, recommend, top_errors,
};
pub use settings::{RecommenderSettings, SettingsError, ValidationRules};
pub use validation::{SentenceValidator, validate};
