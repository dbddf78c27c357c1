//! End-to-end sequencer runs against scripted drivers.

mod common;

use common::{Call, CountingSpeech, StoryDriver};
use kahani_config::KahaniConfig;
use kahani_core::{PipelineStage, StoryRequest, StoryState};
use kahani_dispatch::Dispatcher;
use kahani_error::{KahaniErrorKind, PipelineErrorKind};
use kahani_interface::{KahaniDriver, SpeechSynthesizer};
use kahani_pipeline::{
    EnhanceStage, FilesystemArchive, InMemoryArchive, ScriptedFeedback, Sequencer, SplitStage,
    Stage, StageDrivers, StoryArchive,
};
use std::sync::Arc;

fn config() -> KahaniConfig {
    KahaniConfig::bundled().unwrap()
}

fn sequencer(
    driver: Arc<StoryDriver>,
    speech: Option<Arc<dyn SpeechSynthesizer>>,
    archive: Arc<dyn StoryArchive>,
) -> Sequencer {
    let driver: Arc<dyn KahaniDriver> = driver;
    Sequencer::standard(StageDrivers::uniform(driver), speech, archive, &config())
}

#[tokio::test]
async fn test_full_run_archives_every_artifact() {
    let driver = Arc::new(StoryDriver::new(3));
    let archive = Arc::new(InMemoryArchive::new());
    let sequencer = sequencer(driver.clone(), None, archive.clone());

    let request = StoryRequest::builder()
        .topic("Haunted lighthouse")
        .num_episodes(3u32)
        .languages(vec!["French".to_string()])
        .check_consistency(true)
        .build()
        .unwrap();
    let state = sequencer.run(request).await.unwrap();

    assert_eq!(state.outline.len(), 5);
    assert_eq!(state.characters.len(), 3);
    assert_eq!(state.episodes.len(), 3);
    assert!(state.episodes[2].cliffhanger.is_empty());
    assert_eq!(state.enhanced_episodes.len(), 3);
    assert_eq!(state.dialogues.len(), 3);
    assert!(state.warnings.is_empty(), "{:?}", state.warnings);

    // Option 1 was flagged, repaired, and the re-check came back clean
    assert_eq!(
        state.plot_options[1],
        "The tide reveals the diary only after the storm has passed"
    );
    assert!(state.consistency_issues.is_empty());
    assert_eq!(driver.humans(Call::Consistency).len(), 2);
    assert_eq!(state.selected_plots.len(), 3);

    let runs = archive.runs();
    assert_eq!(runs.len(), 1);
    let slug = &runs[0];
    assert!(archive.text(slug, "story.json").unwrap().contains("Haunted lighthouse"));
    assert!(archive.text(slug, "final_story.md").unwrap().contains("MARA: Not tonight."));
    assert!(archive.text(slug, "final_story_french.md").unwrap().starts_with("TRANSLATED"));
    assert!(
        archive
            .text(slug, "episodes/Episode_2_Night_2.md")
            .unwrap()
            .starts_with("# Episode 2: Night 2")
    );
    assert!(
        archive
            .text(slug, "dialogue/dialogue_episode_3.md")
            .unwrap()
            .starts_with("# Dialogue for Episode 3: Night 3")
    );
}

#[tokio::test]
async fn test_sequencer_stops_on_zero_episodes() {
    let mut driver = StoryDriver::new(3);
    driver.split_reply = Some("~~~ %%% ~~~".to_string());
    let driver = Arc::new(driver);
    let archive = Arc::new(InMemoryArchive::new());
    let sequencer = sequencer(driver.clone(), None, archive.clone());

    let request = StoryRequest::builder().topic("Empty sea").num_episodes(3u32).build().unwrap();
    let err = sequencer.run(request).await.unwrap_err();

    match err.kind() {
        KahaniErrorKind::Pipeline(e) => match &e.kind {
            PipelineErrorKind::StageFailed { stage, .. } => assert_eq!(stage, "split"),
            other => panic!("unexpected pipeline error: {}", other),
        },
        other => panic!("unexpected error: {}", other),
    }
    assert!(driver.humans(Call::Enhance).is_empty());
    assert!(archive.runs().is_empty());
}

#[tokio::test]
async fn test_refinement_passes_accumulated_feedback() {
    let driver = Arc::new(StoryDriver::new(2));
    let feedback = ScriptedFeedback::new()
        .with(PipelineStage::Outline, ["Make it darker", "Cut the ending"])
        .with(PipelineStage::Characters, ["Add a villain"]);
    let sequencer = sequencer(driver.clone(), None, Arc::new(InMemoryArchive::new()))
        .with_feedback(Arc::new(feedback));

    let request = StoryRequest::builder().topic("Fog").num_episodes(2u32).build().unwrap();
    let state = sequencer.run(request).await.unwrap();

    let outlines = driver.humans(Call::Outline);
    assert_eq!(outlines.len(), 3);
    assert!(!outlines[0].contains("Make it darker"));
    assert!(outlines[1].contains("1. Make it darker"));
    assert!(!outlines[1].contains("Cut the ending"));
    assert!(outlines[2].contains("1. Make it darker\n2. Cut the ending"));

    let characters = driver.humans(Call::Characters);
    assert_eq!(characters.len(), 2);
    assert!(characters[1].contains("1. Add a villain"));
    assert!(state.warnings.is_empty());
}

#[tokio::test]
async fn test_refinement_limit_records_warning() {
    let driver = Arc::new(StoryDriver::new(2));
    let feedback = ScriptedFeedback::new().with(PipelineStage::Outline, ["one", "two", "three", "four"]);
    let sequencer = sequencer(driver.clone(), None, Arc::new(InMemoryArchive::new()))
        .with_feedback(Arc::new(feedback))
        .with_max_refinements(2);

    let request = StoryRequest::builder().topic("Fog").num_episodes(2u32).build().unwrap();
    let state = sequencer.run(request).await.unwrap();

    assert_eq!(driver.humans(Call::Outline).len(), 3);
    assert!(
        state
            .warnings
            .iter()
            .any(|w| w.contains("outline exceeded 2 refinements"))
    );
}

#[tokio::test]
async fn test_failed_episode_falls_back_to_outline() {
    let mut driver = StoryDriver::new(3);
    driver.failing_enhance = vec![2];
    let driver = Arc::new(driver);
    let sequencer = sequencer(driver.clone(), None, Arc::new(InMemoryArchive::new()));

    let request = StoryRequest::builder().topic("Storm").num_episodes(3u32).build().unwrap();
    let state = sequencer.run(request).await.unwrap();

    assert_eq!(state.enhanced_episodes.len(), 2);
    assert!(!state.enhanced_episodes.contains_key(&2));
    assert_eq!(state.episode_text(&state.episodes[1]), "Events of night 2.");
    assert!(state.warnings.iter().any(|w| w.contains("Episode 2 enhancement failed")));
    assert_eq!(state.dialogues.len(), 3);
}

#[tokio::test]
async fn test_every_episode_failing_is_fatal() {
    let mut driver = StoryDriver::new(2);
    driver.failing_enhance = vec![1, 2];
    let sequencer = sequencer(Arc::new(driver), None, Arc::new(InMemoryArchive::new()));

    let request = StoryRequest::builder().topic("Storm").num_episodes(2u32).build().unwrap();
    let err = sequencer.run(request).await.unwrap_err();
    assert!(err.to_string().contains("Stage enhance failed"));
}

#[tokio::test]
async fn test_narration_uses_dialogue_and_configured_voice() {
    let driver = Arc::new(StoryDriver::new(2));
    let speech = Arc::new(CountingSpeech::new());
    let synth: Arc<dyn SpeechSynthesizer> = speech.clone();
    let sequencer = sequencer(driver, Some(synth), Arc::new(InMemoryArchive::new()));
    assert!(sequencer.stages().contains(&PipelineStage::Narrate));

    let request = StoryRequest::builder()
        .topic("Storm")
        .num_episodes(2u32)
        .narrate(true)
        .build()
        .unwrap();
    let state = sequencer.run(request).await.unwrap();

    assert_eq!(state.narrations.len(), 2);
    assert_eq!(
        state.narrations[&1],
        b"NARRATOR: The lamp flickers.\nMARA: Not tonight.".to_vec()
    );
    let voices = speech.voices.lock().unwrap();
    assert!(voices.iter().all(|v| v.as_deref() == Some(config().speech.voice.as_str())));
}

#[tokio::test]
async fn test_narration_without_backend_is_skipped_with_warning() {
    let sequencer = sequencer(Arc::new(StoryDriver::new(2)), None, Arc::new(InMemoryArchive::new()));

    let request = StoryRequest::builder()
        .topic("Storm")
        .num_episodes(2u32)
        .narrate(true)
        .build()
        .unwrap();
    let state = sequencer.run(request).await.unwrap();

    assert!(state.narrations.is_empty());
    assert!(state.warnings.iter().any(|w| w.contains("no speech backend")));
}

#[tokio::test]
async fn test_filesystem_archive_writes_run_directory() {
    let dir = tempfile::tempdir().unwrap();
    let archive = Arc::new(FilesystemArchive::new(dir.path()));
    let speech: Arc<dyn SpeechSynthesizer> = Arc::new(CountingSpeech::new());
    let sequencer = sequencer(Arc::new(StoryDriver::new(2)), Some(speech), archive);

    let request = StoryRequest::builder()
        .topic("Tide pools")
        .num_episodes(2u32)
        .languages(vec!["Spanish".to_string()])
        .narrate(true)
        .build()
        .unwrap();
    let state = sequencer.run(request).await.unwrap();

    let run_dir = dir.path().join(state.slug());
    for name in [
        "story.json",
        "story_details.md",
        "final_story.md",
        "final_story_spanish.md",
        "episodes/Episode_1_Night_1.md",
        "episodes/Episode_2_Night_2.md",
        "dialogue/dialogue_episode_1.md",
        "dialogue/dialogue_episode_2.md",
        "narration/episode_1.mp3",
        "narration/episode_2.mp3",
    ] {
        assert!(run_dir.join(name).is_file(), "missing {}", name);
    }

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(run_dir.join("story.json")).unwrap()).unwrap();
    assert_eq!(saved["episodes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_translation_failing_every_chunk_is_skipped() {
    let mut driver = StoryDriver::new(2);
    driver.failing_translate = vec!["German".to_string()];
    let archive = Arc::new(InMemoryArchive::new());
    let sequencer = sequencer(Arc::new(driver), None, archive.clone());

    let request = StoryRequest::builder()
        .topic("Harbor lights")
        .num_episodes(2u32)
        .languages(vec!["German".to_string(), "French".to_string()])
        .build()
        .unwrap();
    let state = sequencer.run(request).await.unwrap();

    assert!(!state.translations.contains_key("German"));
    assert!(state.translations["French"].starts_with("TRANSLATED"));
    assert!(
        state
            .warnings
            .iter()
            .any(|w| w.contains("Translation to German failed for every chunk"))
    );

    let slug = &archive.runs()[0];
    assert!(archive.text(slug, "final_story_german.md").is_none());
    assert!(archive.text(slug, "final_story_french.md").is_some());
}

fn missing_input(err: kahani_error::KahaniError) -> (String, String) {
    match err.kind() {
        KahaniErrorKind::Pipeline(e) => match &e.kind {
            PipelineErrorKind::MissingInput { stage, what } => (stage.clone(), what.clone()),
            other => panic!("unexpected pipeline error: {}", other),
        },
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_split_without_outline_reports_missing_input() {
    let driver = Arc::new(StoryDriver::new(2));
    let stage = SplitStage::new(driver.clone());
    let request = StoryRequest::builder().topic("Fog").num_episodes(2u32).build().unwrap();
    let mut state = StoryState::new(request);

    let err = stage.run(&mut state, &[]).await.unwrap_err();
    assert_eq!(missing_input(err), ("split".to_string(), "outline".to_string()));
    assert!(driver.humans(Call::Split).is_empty());
}

#[tokio::test]
async fn test_enhance_without_episodes_reports_missing_input() {
    let driver = Arc::new(StoryDriver::new(2));
    let stage = EnhanceStage::new(driver.clone(), Dispatcher::new(2));
    let request = StoryRequest::builder().topic("Fog").num_episodes(2u32).build().unwrap();
    let mut state = StoryState::new(request);

    let err = stage.run(&mut state, &[]).await.unwrap_err();
    assert_eq!(missing_input(err), ("enhance".to_string(), "episodes".to_string()));
    assert!(driver.humans(Call::Enhance).is_empty());
}
