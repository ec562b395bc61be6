//! End-to-end pipeline tests against the real registry models.
//!
//! These download model files from the Hugging Face hub on first run,
//! so they are ignored by default. Run with:
//! `cargo test --test pipeline_test -- --ignored`

use sentianalyze::{Classify, Mode, ModelManager, Pipeline};

async fn build_pipeline(mode: Mode) -> Result<Pipeline, Box<dyn std::error::Error>> {
    let manager = ModelManager::new_default()?;
    manager.ensure_downloaded(mode.model_spec()).await?;

    let pipeline = Pipeline::builder()
        .with_model_manager(manager)
        .with_truncation(true)
        .build(mode)?;
    Ok(pipeline)
}

#[tokio::test]
#[ignore = "downloads model files from the Hugging Face hub"]
async fn test_basic_mode_detects_positive_sentiment() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = build_pipeline(Mode::Basic).await?;

    let predictions = pipeline.classify("I absolutely loved this movie, it was wonderful!")?;
    assert_eq!(predictions[0].label, "POSITIVE");
    assert!(predictions[0].score > 0.5);

    // Ordered descending, scores in [0, 1].
    for pair in predictions.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
    assert!(predictions.iter().all(|p| (0.0..=1.0).contains(&p.score)));
    Ok(())
}

#[tokio::test]
#[ignore = "downloads model files from the Hugging Face hub"]
async fn test_advanced_mode_scores_every_emotion() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = build_pipeline(Mode::Advanced).await?;

    let predictions = pipeline.classify("Thank you so much, I really appreciate it!")?;
    assert_eq!(predictions.len(), 28);
    assert_eq!(predictions[0].label, "gratitude");
    Ok(())
}

#[tokio::test]
#[ignore = "downloads model files from the Hugging Face hub"]
async fn test_long_input_is_truncated_not_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = build_pipeline(Mode::Basic).await?;

    let long_text = "this movie was great and I enjoyed every minute of it ".repeat(200);
    let predictions = pipeline.classify(&long_text)?;
    assert!(!predictions.is_empty());
    Ok(())
}

#[tokio::test]
#[ignore = "downloads model files from the Hugging Face hub"]
async fn test_empty_text_is_rejected_before_inference() -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = build_pipeline(Mode::Basic).await?;
    assert!(pipeline.classify("").is_err());
    Ok(())
}
