//! Span helpers for validation runs, pipeline stages, and model calls.

use tracing::Span;

/// Span covering one full validation of an idea.
///
/// ```
/// use fv_telemetry::validation_run_span;
/// let span = validation_run_span("idea-123");
/// let _enter = span.enter();
/// ```
pub fn validation_run_span(idea_id: &str) -> Span {
    tracing::info_span!("validation.run", idea.id = idea_id)
}

/// Span for one pipeline stage (`summarize`, `market`, ...).
pub fn stage_span(stage: &str) -> Span {
    tracing::info_span!("validation.stage", stage = stage)
}

/// Span for an outbound chat-completion request.
pub fn model_call_span(model_name: &str) -> Span {
    tracing::info_span!("model.call", model.name = model_name, otel.kind = "client")
}

/// Span for a research-document analysis.
pub fn nexus_span(research_id: &str) -> Span {
    tracing::info_span!("nexus.analyze", research.id = research_id)
}
