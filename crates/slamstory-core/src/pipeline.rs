//! The two generation pipelines.
//!
//! Panels are generated strictly one after another: at most one image request
//! is in flight, and a failed panel is recorded and skipped over rather than
//! ending the run. The two text features are independent and run together;
//! each is reported as soon as it settles.

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info, warn};

use crate::backend::GenerativeBackend;
use crate::error::Result;
use crate::image::UploadedImage;
use crate::opponent::Opponent;
use crate::panel::PanelResult;
use crate::state::StoryState;
use crate::template::PromptTemplate;
use crate::text::{TextFeature, TextFeatures, TextOutcome};

/// Generate one panel per template, in order. `on_settled` sees each result
/// before the next request is issued.
pub async fn run_panels<F>(
    backend: &dyn GenerativeBackend,
    image: &UploadedImage,
    templates: &[PromptTemplate],
    mut on_settled: F,
) -> Vec<PanelResult>
where
    F: FnMut(usize, &PanelResult),
{
    let total = templates.len();
    let mut results = Vec::with_capacity(total);

    for (index, template) in templates.iter().enumerate() {
        debug!(panel = index + 1, total, title = %template.title, "Requesting panel");

        let result = match backend.generate_image(&template.prompt, image).await {
            Ok(generated) => {
                info!(
                    panel = index + 1,
                    total,
                    bytes = generated.approx_len(),
                    "Panel generated"
                );
                PanelResult::Generated(generated)
            }
            Err(e) => {
                warn!(panel = index + 1, total, title = %template.title, "Panel failed: {}", e);
                PanelResult::Failed(e.to_string())
            }
        };

        on_settled(index, &result);
        results.push(result);
    }

    results
}

/// Request commentary and interview questions concurrently.
pub async fn run_text_features<F>(
    backend: &dyn GenerativeBackend,
    opponent: Opponent,
    mut on_settled: F,
) -> TextFeatures
where
    F: FnMut(TextFeature, &TextOutcome),
{
    let mut pending: FuturesUnordered<_> = TextFeature::all()
        .iter()
        .map(|&feature| async move {
            let outcome = match backend.generate_text(&feature.prompt(opponent)).await {
                Ok(text) => TextOutcome::Generated(text),
                Err(e) => {
                    warn!(?feature, "Text generation failed: {}", e);
                    TextOutcome::Failed(e.to_string())
                }
            };
            (feature, outcome)
        })
        .collect();

    let mut commentary = None;
    let mut interview = None;
    while let Some((feature, outcome)) = pending.next().await {
        on_settled(feature, &outcome);
        match feature {
            TextFeature::Commentary => commentary = Some(outcome),
            TextFeature::Interview => interview = Some(outcome),
        }
    }

    let unsettled = |feature: TextFeature| TextOutcome::Failed(feature.failure_message().to_string());
    TextFeatures {
        commentary: commentary.unwrap_or_else(|| unsettled(TextFeature::Commentary)),
        interview: interview.unwrap_or_else(|| unsettled(TextFeature::Interview)),
    }
}

/// Run the whole storyboard against `state` in the current task.
pub async fn generate_storyboard(
    state: &mut StoryState,
    backend: &dyn GenerativeBackend,
) -> Result<Vec<PanelResult>> {
    let ticket = state.begin_generation()?;

    let results = run_panels(backend, &ticket.image, &ticket.templates, |index, result| {
        state.apply_panel(ticket.generation, index, result.clone());
    })
    .await;

    state.finish_panels(ticket.generation);
    Ok(results)
}

/// Run both text features against `state` in the current task.
pub async fn generate_text_features(
    state: &mut StoryState,
    backend: &dyn GenerativeBackend,
) -> Result<TextFeatures> {
    let ticket = state.begin_text()?;

    let features = run_text_features(backend, ticket.opponent, |feature, outcome| {
        state.apply_text(ticket.generation, feature, outcome.clone());
    })
    .await;

    state.finish_text(ticket.generation);
    Ok(features)
}
