use empathy_application::AnalysisView;
use empathy_domain::{format_confidence, EmotionDescriptor, InteractionState};

pub fn render_view(view: &AnalysisView) -> String {
    format!(
        "{icon} {label}  {confidence} confidence\n  gauge:  {gauge}\n  color:  {color} ({class})\n  text:   {text}\n  audio:  {url}\n  export: {filename}",
        icon = view.descriptor.icon,
        label = view.descriptor.label,
        confidence = view.confidence_label,
        gauge = view.confidence_gauge,
        color = view.descriptor.color,
        class = view.descriptor.style_class,
        text = view.text,
        url = view.audio.url,
        filename = view.audio.suggested_filename,
    )
}

pub fn render_descriptor(descriptor: &EmotionDescriptor) -> String {
    format!(
        "{:<9} {} {:<8} {} {}",
        descriptor.emotion.as_str(),
        descriptor.icon,
        descriptor.label,
        descriptor.color,
        descriptor.style_class
    )
}

/// One-line summary used by the interactive `:state` command.
pub fn render_state(state: &InteractionState) -> String {
    match state {
        InteractionState::Idle => "idle".to_string(),
        InteractionState::Submitting => "submitting: analyzing emotional tone...".to_string(),
        InteractionState::Succeeded(result) => format!(
            "succeeded: {} at {}",
            result.emotion,
            format_confidence(result.confidence)
        ),
        InteractionState::Failed(message) => format!("failed: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use empathy_application::ResultPresenter;
    use empathy_domain::{AnalysisResult, EmotionCategory, EmotionPresentationMapper, RawAnalysis};

    use super::*;

    #[test]
    fn view_lists_label_gauge_text_and_audio() {
        let result = AnalysisResult::try_from(RawAnalysis {
            emotion: Some("joy".into()),
            confidence: Some(0.87),
            text: Some("sunny".into()),
            audio_url: Some("/outputs/c.mp3".into()),
        })
        .expect("valid");
        let view = ResultPresenter::new("http://svc").present(&result);

        let rendered = render_view(&view);
        let lines: Vec<_> = rendered.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[0].ends_with("JOY  87.0% confidence"));
        assert_eq!(lines[1], "  gauge:  87%");
        assert_eq!(lines[2], "  color:  #f59e0b (border-glow-joy)");
        assert_eq!(lines[3], "  text:   sunny");
        assert_eq!(lines[4], "  audio:  http://svc/outputs/c.mp3");
        assert!(lines[5].starts_with("  export: emotion_joy_"));
    }

    #[test]
    fn descriptor_line_lists_every_attribute() {
        let line = render_descriptor(&EmotionPresentationMapper::describe(EmotionCategory::Anger));
        assert!(line.starts_with("anger"));
        assert!(line.contains("ANGER"));
        assert!(line.contains("#ef4444"));
        assert!(line.ends_with("border-glow-anger"));
    }

    #[test]
    fn state_summary_names_the_state() {
        let result = AnalysisResult::try_from(RawAnalysis {
            emotion: Some("fear".into()),
            confidence: Some(0.5),
            text: Some("boo".into()),
            audio_url: Some("/outputs/a.mp3".into()),
        })
        .expect("valid");

        let neutral = AnalysisResult::try_from(RawAnalysis {
            emotion: Some("neutral".into()),
            confidence: Some(-0.0),
            text: Some("meh".into()),
            audio_url: Some("/outputs/b.mp3".into()),
        })
        .expect("valid");

        assert_eq!(render_state(&InteractionState::Idle), "idle");
        assert_eq!(
            render_state(&InteractionState::Succeeded(neutral)),
            "succeeded: neutral at 0.0%"
        );
        assert_eq!(
            render_state(&InteractionState::Succeeded(result)),
            "succeeded: fear at 50.0%"
        );
        assert_eq!(
            render_state(&InteractionState::Failed("nope".into())),
            "failed: nope"
        );
    }
}
