use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use anyhow::Error;
use empathy_application::{InputController, SubmitOutcome};
use empathy_domain::{EmotionPresentationMapper, InteractionState};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::render::{render_descriptor, render_state, render_view};
use crate::Application;

type PendingSubmission = Pin<Box<dyn Future<Output = SubmitOutcome>>>;

enum Flow {
    Continue,
    Quit,
}

/// Line-oriented operator session. Plain lines accumulate in the input buffer; lines starting
/// with `:` are commands. Input keeps being read while an analysis is in flight.
pub struct InteractiveSession<'a, W> {
    app: &'a Application,
    input: InputController,
    pending: Option<PendingSubmission>,
    writer: W,
}

impl<'a, W> InteractiveSession<'a, W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(app: &'a Application, writer: W) -> Self {
        Self {
            app,
            input: app.input_controller(),
            pending: None,
            writer,
        }
    }

    pub async fn run<R>(mut self, reader: R) -> Result<(), Error>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = reader.lines();
        self.say(&format!(
            "analysis service: {}. Type narrative text, then :submit (:quit to leave).",
            self.app.orchestrator.base_url()
        ))
        .await?;

        loop {
            tokio::select! {
                biased;
                outcome = settle(&mut self.pending), if self.pending.is_some() => {
                    self.pending = None;
                    self.report(outcome).await?;
                }
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    if let Flow::Quit = self.handle_line(&line).await? {
                        return Ok(());
                    }
                }
            }
        }

        if let Some(pending) = self.pending.take() {
            let outcome = pending.await;
            self.report(outcome).await?;
        }
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Result<Flow, Error> {
        let line = line.trim_end();
        let Some(command) = line.strip_prefix(':') else {
            self.append(line);
            return Ok(Flow::Continue);
        };

        let (name, argument) = match command.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, Some(rest.trim()).filter(|rest| !rest.is_empty())),
            None => (command, None),
        };
        match name {
            "submit" => self.submit().await?,
            "clear" => {
                self.pending = None;
                self.input.clear();
                self.say("cleared").await?;
            }
            "state" => {
                let state = self.app.orchestrator.state();
                self.say(&render_state(&state)).await?;
            }
            "export" => self.export(argument.map(Path::new)).await?,
            "legend" => self.legend(argument).await?,
            "quit" | "q" => return Ok(Flow::Quit),
            other => self.say(&format!("unknown command `:{other}`")).await?,
        }
        Ok(Flow::Continue)
    }

    fn append(&mut self, line: &str) {
        let text = match self.input.text() {
            "" => line.to_string(),
            current => format!("{current}\n{line}"),
        };
        self.input.set_text(text);
    }

    async fn submit(&mut self) -> Result<(), Error> {
        let orchestrator = self.input.orchestrator().clone();
        let request = match self.input.request() {
            Ok(request) => request,
            Err(error) => {
                let outcome = orchestrator.reject_invalid(error);
                return self.report(outcome).await;
            }
        };

        match orchestrator.begin(request) {
            Some(ticket) => {
                self.pending = Some(Box::pin(async move { orchestrator.execute(ticket).await }));
                self.say("analyzing emotional tone...").await
            }
            None => self.report(SubmitOutcome::Rejected).await,
        }
    }

    async fn export(&mut self, directory: Option<&Path>) -> Result<(), Error> {
        let state = self.app.orchestrator.state();
        let Some(view) = self.app.presenter.present_state(&state) else {
            return self.say("nothing to export: no successful analysis").await;
        };
        match self.app.export(&view, directory).await {
            Ok(path) => self.say(&format!("exported to {}", path.display())).await,
            Err(error) => self.say(&format!("export failed: {error}")).await,
        }
    }

    async fn legend(&mut self, emotion: Option<&str>) -> Result<(), Error> {
        match emotion {
            Some(raw) => match EmotionPresentationMapper::lookup(raw) {
                Ok(descriptor) => self.say(&render_descriptor(&descriptor)).await,
                Err(error) => self.say(&format!("error: {error}")).await,
            },
            None => {
                for descriptor in EmotionPresentationMapper::legend() {
                    self.say(&render_descriptor(&descriptor)).await?;
                }
                Ok(())
            }
        }
    }

    async fn report(&mut self, outcome: SubmitOutcome) -> Result<(), Error> {
        match outcome {
            SubmitOutcome::Applied(InteractionState::Succeeded(result)) => {
                let view = self.app.presenter.present(&result);
                self.say(&render_view(&view)).await
            }
            SubmitOutcome::Applied(InteractionState::Failed(message)) => {
                self.say(&format!("error: {message}")).await
            }
            SubmitOutcome::Applied(state) => self.say(&render_state(&state)).await,
            SubmitOutcome::Rejected => self.say("analysis already in progress").await,
            SubmitOutcome::Superseded => {
                tracing::debug!("stale analysis response dropped");
                Ok(())
            }
        }
    }

    async fn say(&mut self, text: &str) -> Result<(), Error> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}

async fn settle(pending: &mut Option<PendingSubmission>) -> SubmitOutcome {
    match pending.as_mut() {
        Some(submission) => submission.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use empathy_configuration::AppConfig;
    use empathy_domain::{AnalysisRequest, AnalysisServicePort, AudioSourcePort, DomainError, RawAnalysis};

    use super::*;

    struct FakeService {
        calls: AtomicUsize,
        hang: bool,
    }

    impl FakeService {
        fn new(hang: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                hang,
            })
        }
    }

    #[async_trait]
    impl AnalysisServicePort for FakeService {
        fn base_url(&self) -> &str {
            "http://svc"
        }

        async fn analyze(&self, request: &AnalysisRequest) -> Result<RawAnalysis, DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                return std::future::pending().await;
            }
            Ok(RawAnalysis {
                emotion: Some("joy".into()),
                confidence: Some(0.951),
                text: Some(request.text().to_string()),
                audio_url: Some("/outputs/audio_joy.mp3".into()),
            })
        }
    }

    #[async_trait]
    impl AudioSourcePort for FakeService {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, DomainError> {
            assert_eq!(url, "http://svc/outputs/audio_joy.mp3");
            Ok(b"ID3".to_vec())
        }
    }

    async fn run_script(service: Arc<FakeService>, script: &str) -> (Application, String) {
        let app = Application::with_services(AppConfig::default(), service.clone(), service);
        let mut out = Vec::new();
        InteractiveSession::new(&app, &mut out)
            .run(script.as_bytes())
            .await
            .expect("session runs");
        (app, String::from_utf8(out).expect("utf8 output"))
    }

    #[tokio::test]
    async fn lines_accumulate_until_submit() {
        let service = FakeService::new(false);
        let (app, out) = run_script(service.clone(), "What a day\nfor a walk\n:submit\n:state\n").await;

        assert!(out.contains("JOY  95.1% confidence"));
        assert!(out.contains("text:   What a day\nfor a walk"));
        assert!(out.contains("succeeded: joy at 95.1%"));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert!(app.orchestrator.state().result().is_some());
    }

    #[tokio::test]
    async fn empty_buffer_fails_locally() {
        let service = FakeService::new(false);
        let (_, out) = run_script(service.clone(), "   \n:submit\n").await;

        assert!(out.contains("error: Please enter narrative text for analysis"));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn second_submit_while_in_flight_is_rejected_and_clear_cancels() {
        let service = FakeService::new(true);
        let (app, out) = run_script(service.clone(), "hello\n:submit\n:submit\n:clear\n:state\n").await;

        assert!(out.contains("analyzing emotional tone..."));
        assert!(out.contains("analysis already in progress"));
        assert!(out.ends_with("cleared\nidle\n"));
        assert_eq!(service.calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.orchestrator.state(), InteractionState::Idle);
    }

    #[tokio::test]
    async fn export_writes_current_result() {
        let dir = tempfile::tempdir().expect("temp dir");
        let script = format!("hello\n:export\n:submit\n:export {}\n", dir.path().display());
        let (_, out) = run_script(FakeService::new(false), &script).await;

        assert!(out.contains("nothing to export"));
        assert!(out.contains("exported to"));
        let written: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name().into_string().expect("name"))
            .collect();
        assert_eq!(written.len(), 1);
        assert!(written[0].starts_with("emotion_joy_"));
    }

    #[tokio::test]
    async fn legend_lists_and_looks_up() {
        let (_, out) = run_script(FakeService::new(false), ":legend\n:legend surprise\n:legend sarcasm\n:bogus\n").await;

        assert_eq!(out.matches("border-glow-").count(), 8);
        assert!(out.contains("error: No presentation descriptor for emotion `sarcasm`"));
        assert!(out.contains("unknown command `:bogus`"));
    }

    #[tokio::test]
    async fn quit_stops_reading() {
        let service = FakeService::new(false);
        let (_, out) = run_script(service.clone(), ":quit\nhello\n:submit\n").await;

        assert!(!out.contains("analyzing"));
        assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    }
}
