mod export_audio;

pub use export_audio::{ExportAudioUseCase, ExportAudioUseCaseImpl};
