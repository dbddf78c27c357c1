//! The linear stage chain with bounded feedback loops.

use crate::archive::StoryArchive;
use crate::feedback::{AcceptAll, Feedback, FeedbackSource};
use crate::stages::{
    CharactersStage, ConsistencyChecker, DialogueStage, EnhanceStage, FinalizeStage, NarrateStage,
    OutlineStage, PlotStage, SplitStage, Stage, TranslateStage, stage_failed,
};
use kahani_config::KahaniConfig;
use kahani_core::{PipelineStage, StoryRequest, StoryState};
use kahani_dispatch::Dispatcher;
use kahani_error::{KahaniResult, PipelineErrorKind};
use kahani_interface::{KahaniDriver, SpeechSynthesizer};
use std::sync::Arc;

/// Revisions allowed per feedback loop when none are configured.
const DEFAULT_MAX_REFINEMENTS: usize = 3;

/// One model driver per model-backed stage.
#[derive(Clone)]
pub struct StageDrivers {
    /// Outline generation and refinement
    pub outline: Arc<dyn KahaniDriver>,
    /// Character development and refinement
    pub characters: Arc<dyn KahaniDriver>,
    /// Plot option generation
    pub plot: Arc<dyn KahaniDriver>,
    /// Consistency checking and option improvement
    pub consistency: Arc<dyn KahaniDriver>,
    /// Episode split
    pub split: Arc<dyn KahaniDriver>,
    /// Episode enhancement
    pub enhance: Arc<dyn KahaniDriver>,
    /// Dialogue scripts
    pub dialogue: Arc<dyn KahaniDriver>,
    /// Translation
    pub translate: Arc<dyn KahaniDriver>,
}

impl StageDrivers {
    /// The same driver for every stage.
    pub fn uniform(driver: Arc<dyn KahaniDriver>) -> Self {
        Self {
            outline: driver.clone(),
            characters: driver.clone(),
            plot: driver.clone(),
            consistency: driver.clone(),
            split: driver.clone(),
            enhance: driver.clone(),
            dialogue: driver.clone(),
            translate: driver,
        }
    }
}

/// Runs the stages in order over one [`StoryState`].
///
/// After a stage that accepts feedback, the [`FeedbackSource`] is asked for
/// a verdict; each revision re-runs the stage with every note given so
/// far. Past `max_refinements` revisions the loop stops with a warning.
///
/// A failing required stage, or one that leaves no outline, characters or
/// episodes, ends the run with a `StageFailed` error. Optional stages only
/// record warnings.
pub struct Sequencer {
    stages: Vec<Box<dyn Stage>>,
    feedback: Arc<dyn FeedbackSource>,
    max_refinements: usize,
}

impl Sequencer {
    /// Sequencer over `stages`, accepting every draft.
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self {
            stages,
            feedback: Arc::new(AcceptAll),
            max_refinements: DEFAULT_MAX_REFINEMENTS,
        }
    }

    /// The full chain from configuration.
    ///
    /// Narration is included only when a synthesizer is given.
    pub fn standard(
        drivers: StageDrivers,
        speech: Option<Arc<dyn SpeechSynthesizer>>,
        archive: Arc<dyn StoryArchive>,
        config: &KahaniConfig,
    ) -> Self {
        let dispatcher = Dispatcher::from_config(&config.dispatch);

        let mut stages: Vec<Box<dyn Stage>> = vec![
            Box::new(OutlineStage::new(drivers.outline)),
            Box::new(CharactersStage::new(drivers.characters)),
            Box::new(
                PlotStage::new(drivers.plot)
                    .with_checker(ConsistencyChecker::new(drivers.consistency)),
            ),
            Box::new(SplitStage::new(drivers.split)),
            Box::new(EnhanceStage::new(drivers.enhance, dispatcher.clone())),
            Box::new(DialogueStage::new(drivers.dialogue, dispatcher.clone())),
            Box::new(TranslateStage::new(
                drivers.translate,
                dispatcher.clone(),
                config.translation.max_chunk_chars,
            )),
        ];
        if let Some(synth) = speech {
            stages.push(Box::new(
                NarrateStage::new(synth, dispatcher).with_voice(config.speech.voice.clone()),
            ));
        }
        stages.push(Box::new(FinalizeStage::new(archive)));

        Self::new(stages).with_max_refinements(config.pipeline.max_refinements)
    }

    /// Consult `source` after refinable stages.
    pub fn with_feedback(mut self, source: Arc<dyn FeedbackSource>) -> Self {
        self.feedback = source;
        self
    }

    /// Allow at most `limit` revisions per feedback loop.
    pub fn with_max_refinements(mut self, limit: usize) -> Self {
        self.max_refinements = limit;
        self
    }

    /// Stage kinds in execution order.
    pub fn stages(&self) -> Vec<PipelineStage> {
        self.stages.iter().map(|s| s.kind()).collect()
    }

    /// Run every stage for `request` and return the finished state.
    #[tracing::instrument(skip_all, fields(topic = %request.topic(), episodes = request.num_episodes()))]
    pub async fn run(&self, request: StoryRequest) -> KahaniResult<StoryState> {
        let mut state = StoryState::new(request);
        self.run_state(&mut state).await?;
        Ok(state)
    }

    /// Run every stage against an existing state.
    pub async fn run_state(&self, state: &mut StoryState) -> KahaniResult<()> {
        if *state.request.narrate() && !self.stages().contains(&PipelineStage::Narrate) {
            tracing::warn!("Narration requested but no speech backend configured");
            state.warn("Narration requested but no speech backend configured; skipped");
        }

        for stage in &self.stages {
            let kind = stage.kind();
            tracing::info!(stage = %kind, "Running stage");

            match self.run_stage(stage.as_ref(), state).await {
                Ok(()) => {}
                Err(e) if kind.is_required() || kind == PipelineStage::Finalize => {
                    tracing::error!(stage = %kind, error = %e, "Stage failed");
                    return Err(e);
                }
                Err(e) => {
                    tracing::warn!(stage = %kind, error = %e, "Optional stage failed, continuing");
                    state.warn(format!("Stage {} failed: {}", kind, e));
                }
            }

            if let Some(reason) = missing_output(kind, state) {
                tracing::error!(stage = %kind, reason, "Stage produced no usable output");
                return Err(stage_failed(kind, reason));
            }
        }

        tracing::info!(warnings = state.warnings.len(), "Story complete");
        Ok(())
    }

    async fn run_stage(&self, stage: &dyn Stage, state: &mut StoryState) -> KahaniResult<()> {
        let kind = stage.kind();
        let mut notes: Vec<String> = Vec::new();
        stage.run(state, &notes).await?;

        if !kind.accepts_feedback() {
            return Ok(());
        }

        loop {
            match self.feedback.review(kind, notes.len()) {
                Feedback::Accept => return Ok(()),
                Feedback::Revise(note) => {
                    if notes.len() >= self.max_refinements {
                        let limit = PipelineErrorKind::RefinementLimit {
                            stage: kind.to_string(),
                            limit: self.max_refinements,
                        };
                        tracing::warn!(stage = %kind, %limit, "Ignoring further feedback");
                        state.warn(limit.to_string());
                        return Ok(());
                    }
                    tracing::info!(stage = %kind, round = notes.len() + 1, "Revising with feedback");
                    notes.push(note);
                    stage.run(state, &notes).await?;
                }
            }
        }
    }
}

/// Why `kind` left the state unusable, if it did.
fn missing_output(kind: PipelineStage, state: &StoryState) -> Option<&'static str> {
    match kind {
        PipelineStage::Outline if state.outline.is_empty() => Some("no outline events parsed"),
        PipelineStage::Characters if state.characters.is_empty() => Some("no characters parsed"),
        PipelineStage::Split if state.episodes.iter().all(|e| e.synthetic) => {
            Some("no episodes parsed")
        }
        _ => None,
    }
}
