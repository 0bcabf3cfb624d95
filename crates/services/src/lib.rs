#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod practice_service;
pub mod progress_service;
pub mod quiz;

pub use soap_core::Clock;

pub use error::{PracticeServiceError, ProgressServiceError};
pub use practice_service::{PracticeOutcome, PracticeService};
pub use progress_service::{ProgressOverview, ProgressService, SectionOverview};
