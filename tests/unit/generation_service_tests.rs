/*!
 * Tests for the generation service through its public interface
 */

use std::sync::Arc;

use qrayti::errors::GenerationError;
use qrayti::generation::prompts::{QUIZ_BUDGET, SUMMARY_BUDGET};
use qrayti::generation::GenerationService;
use qrayti::providers::mock::MockProvider;

use crate::common::COURSE_TEXT;

async fn loaded(provider: &MockProvider) -> GenerationService {
    let service = GenerationService::new(Arc::new(provider.clone()), "local (mock)");
    service.load_model().await.unwrap();
    service
}

#[tokio::test]
async fn test_generateQuiz_wellFormedPayload_shouldReturnNumberedQuestions() {
    let provider = MockProvider::scripted([MockProvider::quiz_payload(3)]);
    let service = loaded(&provider).await;

    let questions = service.generate_quiz(COURSE_TEXT, 3).await.unwrap();

    let ids: Vec<usize> = questions.iter().map(|q| q.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert!(questions.iter().all(|q| q.correct_index < q.options.len()));
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_generateQuiz_fewerQuestionsThanAsked_shouldReturnWhatWasValid() {
    let provider = MockProvider::scripted([MockProvider::quiz_payload(2)]);
    let service = loaded(&provider).await;

    let questions = service.generate_quiz(COURSE_TEXT, 5).await.unwrap();

    assert_eq!(questions.len(), 2);
    assert_eq!(questions[1].id, 2);
}

#[tokio::test]
async fn test_generateQuiz_primaryPrompt_shouldNameCountAndContent() {
    let provider = MockProvider::scripted([MockProvider::quiz_payload(4)]);
    let service = loaded(&provider).await;

    service.generate_quiz(COURSE_TEXT, 4).await.unwrap();

    let request = &provider.requests()[0];
    assert!(request.prompt.contains("4 questions"));
    assert!(request.prompt.contains("accord de volontes"));
    assert_eq!(request.max_new_tokens, QUIZ_BUDGET.primary);
}

#[tokio::test]
async fn test_generateQuiz_emptyOutputTwice_shouldFailWithoutFallback() {
    let provider = MockProvider::empty();
    let service = loaded(&provider).await;

    let result = service.generate_quiz(COURSE_TEXT, 3).await;

    match result {
        Err(GenerationError::Exhausted { message }) => {
            assert!(message.starts_with("Failed to generate valid quiz after retry"));
        }
        other => panic!("expected exhausted error, got {:?}", other),
    }
    assert_eq!(provider.request_count(), 2);
}

#[tokio::test]
async fn test_generateSummary_invalidThenValid_shouldUseRetryBudget() {
    let provider = MockProvider::scripted([
        r#"{"sections": []}"#.to_string(),
        MockProvider::summary_payload(2),
    ]);
    let service = loaded(&provider).await;

    let sections = service.generate_summary(COURSE_TEXT).await.unwrap();

    assert_eq!(sections.len(), 2);
    let requests = provider.requests();
    assert_eq!(requests[0].max_new_tokens, SUMMARY_BUDGET.primary);
    assert_eq!(requests[1].max_new_tokens, SUMMARY_BUDGET.retry);
}

#[tokio::test]
async fn test_generateSummary_notLoaded_shouldReturnModelNotReady() {
    let provider = MockProvider::scripted([MockProvider::summary_payload(1)]);
    let service = GenerationService::new(Arc::new(provider.clone()), "local (mock)");

    let result = service.generate_summary(COURSE_TEXT).await;

    assert!(matches!(result, Err(GenerationError::ModelNotReady)));
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_generate_concurrentRequests_shouldShareOneService() {
    let provider = MockProvider::slow(20, [MockProvider::quiz_payload(2)]);
    let service = Arc::new(loaded(&provider).await);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.generate_quiz(COURSE_TEXT, 2).await })
        })
        .collect();

    for handle in handles {
        let questions = handle.await.unwrap().unwrap();
        assert_eq!(questions.len(), 2);
    }
    assert_eq!(provider.request_count(), 4);
}
