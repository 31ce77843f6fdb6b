use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Error};
use empathy_application::{
    AnalysisView, ExportAudioUseCase, ExportAudioUseCaseImpl, InputController,
    RequestOrchestrator, ResultPresenter, SubmitOutcome,
};
use empathy_configuration::AppConfig;
use empathy_domain::{AnalysisServicePort, AudioSourcePort, InteractionState};
use empathy_infra_analysis_rest::RestAnalysisClient;

pub struct Application {
    pub config: AppConfig,
    pub orchestrator: Arc<RequestOrchestrator>,
    pub presenter: ResultPresenter,
    pub exporter: Arc<dyn ExportAudioUseCase>,
}

impl Application {
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let client = Arc::new(rest_client(&config)?);
        tracing::info!(base_url = %client.base_url(), "analysis service configured");
        Ok(Self::with_services(config, client.clone(), client))
    }

    pub fn with_services(
        config: AppConfig,
        analysis: Arc<dyn AnalysisServicePort>,
        audio: Arc<dyn AudioSourcePort>,
    ) -> Self {
        let presenter = ResultPresenter::new(analysis.base_url());
        let orchestrator = Arc::new(RequestOrchestrator::new(analysis));
        let exporter: Arc<dyn ExportAudioUseCase> = Arc::new(ExportAudioUseCaseImpl::new(audio));
        Self {
            config,
            orchestrator,
            presenter,
            exporter,
        }
    }

    pub fn input_controller(&self) -> InputController {
        InputController::new(self.orchestrator.clone())
    }

    /// Runs one submission to completion and presents the result.
    pub async fn analyze_once(&self, text: &str) -> Result<AnalysisView, Error> {
        let mut input = self.input_controller();
        input.set_text(text);
        match input.submit().await {
            SubmitOutcome::Applied(InteractionState::Succeeded(result)) => {
                Ok(self.presenter.present(&result))
            }
            SubmitOutcome::Applied(InteractionState::Failed(message)) => Err(anyhow!(message)),
            other => Err(anyhow!("analysis did not complete: {other:?}")),
        }
    }

    pub async fn export(
        &self,
        view: &AnalysisView,
        directory: Option<&Path>,
    ) -> Result<PathBuf, Error> {
        let directory = directory.unwrap_or(self.config.export.directory.as_path());
        Ok(self.exporter.export(&view.audio, directory).await?)
    }
}

pub fn rest_client(config: &AppConfig) -> Result<RestAnalysisClient, Error> {
    RestAnalysisClient::new(
        &config.service.normalized_base_url(),
        config.service.connect_timeout(),
        config.service.request_timeout(),
    )
    .map_err(|err| anyhow!("failed to create analysis client: {err}"))
}

#[cfg(test)]
mod tests {
    use axum::{
        routing::{get, post},
        Json, Router,
    };
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    use super::*;

    async fn start_analysis_service() -> (String, tokio::task::JoinHandle<()>) {
        let router = Router::new()
            .route(
                "/process",
                post(|Json(body): Json<Value>| async move {
                    Json(json!({
                        "emotion": "sadness",
                        "confidence": 0.7352,
                        "audio_url": "/outputs/audio_sadness_20260121_101010.mp3",
                        "text": body["text"],
                    }))
                }),
            )
            .route(
                "/outputs/{file}",
                get(|| async { vec![0xff_u8, 0xfb, 0x90, 0x00] }),
            );
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let server = tokio::spawn(async move {
            axum::serve(listener, router).await.expect("server run");
        });
        (format!("http://{addr}"), server)
    }

    #[tokio::test]
    async fn analyze_and_export_against_running_service() {
        let (base_url, server) = start_analysis_service().await;
        let export_dir = tempfile::tempdir().expect("temp dir");
        let mut config = AppConfig::default();
        config.service.base_url = format!("{base_url}/");
        config.export.directory = export_dir.path().to_path_buf();

        let app = Application::new(config).expect("app should initialize");
        let view = app
            .analyze_once("  The rain would not stop.  ")
            .await
            .expect("analysis succeeds");

        assert_eq!(view.descriptor.label, "SADNESS");
        assert_eq!(view.confidence_label, "73.5%");
        assert_eq!(view.text, "The rain would not stop.");
        assert_eq!(
            view.audio.url,
            format!("{base_url}/outputs/audio_sadness_20260121_101010.mp3")
        );

        let path = app.export(&view, None).await.expect("export succeeds");
        assert!(path.starts_with(export_dir.path()));
        assert_eq!(std::fs::read(&path).expect("exported file"), vec![0xff, 0xfb, 0x90, 0x00]);

        server.abort();
    }

    #[tokio::test]
    async fn unreachable_service_reports_fallback_message() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .expect("bind ephemeral port")
            .local_addr()
            .expect("extract local address")
            .port();
        let mut config = AppConfig::default();
        config.service.base_url = format!("http://127.0.0.1:{port}");

        let app = Application::new(config).expect("app should initialize");
        let error = app.analyze_once("hello").await.expect_err("nothing listening");

        assert_eq!(
            error.to_string(),
            format!("Backend connection failed. Verify service is running at http://127.0.0.1:{port}")
        );
        assert_eq!(app.orchestrator.state().name(), "failed");
    }

    #[tokio::test]
    async fn blank_text_never_reaches_the_service() {
        let mut config = AppConfig::default();
        config.service.base_url = "http://127.0.0.1:9".to_string();
        let app = Application::new(config).expect("app should initialize");

        let error = app.analyze_once(" \n ").await.expect_err("blank text");

        assert_eq!(error.to_string(), "Please enter narrative text for analysis");
    }
}
