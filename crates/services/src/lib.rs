#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod progress_service;
pub mod remote_bank;
pub mod sessions;

pub use quiz_core::Clock;

pub use app_services::{AppServices, BankSource};
pub use error::{AppServicesError, ProgressError, QuizError, RemoteBankError};
pub use progress_service::{PROGRESS_KEY, ProgressStore};
pub use remote_bank::{RemoteBankConfig, RemoteQuestionBank};
pub use sessions::{
    Advance, ModuleOverview, Phase, QuizService, QuizSnapshot, SessionProgress, SessionResult,
    sample,
};
