//! Story run command handler.

use super::RunArgs;
use kahani::{
    ApiKeys, FilesystemArchive, KahaniConfig, KahaniError, KahaniResult, PipelineStage,
    ScriptedFeedback, Sequencer, StoryRequest, StoryState, speech_backend, stage_drivers,
};
use kahani_error::BuilderError;
use std::sync::Arc;

/// Build the request and pipeline from `args` and configuration, and run it.
#[tracing::instrument(skip_all, fields(topic = %args.topic, episodes = args.episodes))]
pub async fn run_story(args: RunArgs) -> KahaniResult<StoryState> {
    let config = KahaniConfig::load()?;
    let keys = ApiKeys::from_env();
    if !keys.any() {
        tracing::warn!("Neither OPENAI_API_KEY nor GROQ_API_KEY is set");
    }

    let drivers = stage_drivers(&config, &keys)?;
    let speech = if args.narrate {
        match speech_backend(&config, &keys) {
            Ok(speech) => Some(speech),
            Err(e) => {
                tracing::warn!(error = %e, "Narration unavailable");
                None
            }
        }
    } else {
        None
    };

    let output_dir = args.output.clone().unwrap_or_else(|| config.pipeline.output_dir.clone());
    let archive = FilesystemArchive::new(&output_dir).with_audio_extension(config.speech.format.clone());
    let feedback = ScriptedFeedback::new()
        .with(PipelineStage::Outline, args.outline_feedback.clone())
        .with(PipelineStage::Characters, args.character_feedback.clone());

    let sequencer = Sequencer::standard(drivers, speech, Arc::new(archive), &config)
        .with_feedback(Arc::new(feedback));
    tracing::debug!(stages = ?sequencer.stages(), "Pipeline assembled");

    let request = StoryRequest::builder()
        .topic(args.topic)
        .num_episodes(args.episodes)
        .story_type(args.story_type)
        .style(args.style)
        .languages(args.languages)
        .narrate(args.narrate)
        .check_consistency(args.check_consistency)
        .build()
        .map_err(|e| KahaniError::from(BuilderError::from(e.to_string())))?;

    let state = sequencer.run(request).await?;
    tracing::info!(
        output = %output_dir.join(state.slug()).display(),
        episodes = state.episodes.len(),
        warnings = state.warnings.len(),
        "Story generated"
    );
    Ok(state)
}
