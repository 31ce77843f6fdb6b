pub mod dto;
pub mod error;
pub mod input;
pub mod orchestrator;
pub mod presenter;
pub mod usecase;

pub use dto::*;
pub use error::*;
pub use input::InputController;
pub use orchestrator::{RequestOrchestrator, SubmissionTicket, SubmitOutcome};
pub use presenter::ResultPresenter;
pub use usecase::{ExportAudioUseCase, ExportAudioUseCaseImpl};
