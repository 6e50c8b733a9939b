use std::sync::Arc;

use client::{InMemoryBackend, TestBackend};
use quiz_core::model::{Question, QuestionId, QuestionKind, Test, TestId};
use quiz_core::time::fixed_clock;
use services::{
    QUESTION_SECONDS, QuestionBody, SessionController, SessionEvent, SessionPhase, SessionView,
};

fn single_choice(id: u64, labels: &[&str]) -> Question {
    Question::new(
        QuestionId::new(id),
        format!("Question {id}"),
        QuestionKind::SingleChoice,
        labels.iter().map(|s| (*s).to_string()).collect(),
        None,
    )
    .unwrap()
}

fn free_text(id: u64) -> Question {
    Question::new(
        QuestionId::new(id),
        format!("Question {id}"),
        QuestionKind::FreeText,
        Vec::new(),
        None,
    )
    .unwrap()
}

#[tokio::test]
async fn two_question_walkthrough() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.insert_test(
        Test::new(
            TestId::new(1),
            "Walkthrough",
            None,
            vec![single_choice(1, &["A", "B"]), free_text(2)],
        )
        .unwrap(),
    );

    let mut controller = SessionController::start_by_test_id(
        Arc::clone(&backend) as Arc<dyn TestBackend>,
        fixed_clock(),
        TestId::new(1),
    )
    .await
    .unwrap();
    assert_eq!(controller.session().store().current_index(), 0);

    // Selecting "B" buffers "2" and submits once.
    controller
        .handle(SessionEvent::SelectOption(1))
        .await
        .unwrap();
    let answer = controller
        .session()
        .store()
        .answer(QuestionId::new(1))
        .unwrap();
    assert_eq!(answer.to_wire(), "2");
    assert_eq!(backend.submission_count(), 1);

    // Next moves to the free-text question with a fresh timer.
    controller.handle(SessionEvent::Next).await.unwrap();
    assert_eq!(controller.session().store().current_index(), 1);
    assert_eq!(controller.session().timer().remaining(), QUESTION_SECONDS);

    // Typing stays local; next flushes the text and opens the gate.
    controller
        .handle(SessionEvent::InputText("hello".into()))
        .await
        .unwrap();
    assert_eq!(backend.submission_count(), 1);

    controller.handle(SessionEvent::Next).await.unwrap();
    assert_eq!(
        controller
            .session()
            .store()
            .answer(QuestionId::new(2))
            .unwrap()
            .to_wire(),
        "hello"
    );
    let submitted = backend.submitted();
    assert_eq!(submitted.len(), 2);
    assert_eq!(submitted[1].question_id, QuestionId::new(2));
    assert_eq!(submitted[1].value, "hello");
    assert_eq!(controller.session().phase(), SessionPhase::ConfirmingFinish);

    // Confirming finalizes the attempt and hands off to results.
    let attempt_id = controller.session().attempt_id();
    let step = controller.handle(SessionEvent::ConfirmFinish).await.unwrap();
    assert_eq!(step.end.map(|end| end.attempt_id), Some(attempt_id));
    assert!(backend.is_finished(attempt_id));
    assert!(controller.session().is_finished());
}

#[tokio::test]
async fn unattended_one_question_test_finishes_on_expiry() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.insert_test(
        Test::new(
            TestId::new(1),
            "Unattended",
            None,
            vec![single_choice(1, &["A", "B"])],
        )
        .unwrap(),
    );

    let mut controller = SessionController::start_by_test_id(
        Arc::clone(&backend) as Arc<dyn TestBackend>,
        fixed_clock(),
        TestId::new(1),
    )
    .await
    .unwrap();

    let mut end = None;
    for _ in 0..QUESTION_SECONDS {
        let step = controller.tick().await.unwrap();
        if step.end.is_some() {
            end = step.end;
        }
    }

    // No confirmation gate on the expiry path.
    let attempt_id = controller.session().attempt_id();
    assert_eq!(end.map(|e| e.attempt_id), Some(attempt_id));
    assert!(backend.is_finished(attempt_id));
    assert!(controller.session().is_finished());
}

#[tokio::test]
async fn expiry_mid_test_advances_exactly_once() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.insert_test(
        Test::new(
            TestId::new(1),
            "Expiry",
            None,
            vec![single_choice(1, &["A"]), single_choice(2, &["A"])],
        )
        .unwrap(),
    );

    let mut controller = SessionController::start_by_test_id(
        Arc::clone(&backend) as Arc<dyn TestBackend>,
        fixed_clock(),
        TestId::new(1),
    )
    .await
    .unwrap();

    for _ in 0..QUESTION_SECONDS {
        controller.tick().await.unwrap();
    }

    assert_eq!(controller.session().store().current_index(), 1);
    assert_eq!(controller.session().phase(), SessionPhase::Active);
    // The restarted timer is counting the second question down.
    assert!(controller.session().timer().is_running());
    assert_eq!(controller.session().timer().remaining(), QUESTION_SECONDS);
}

#[tokio::test]
async fn jump_displays_the_jumped_to_question() {
    let backend = Arc::new(InMemoryBackend::new());
    let questions = vec![
        single_choice(1, &["A"]),
        single_choice(2, &["A"]),
        free_text(3),
        single_choice(4, &["A", "B"]),
    ];
    let test = Test::new(TestId::new(1), "Jump", None, questions).unwrap();
    backend.insert_test(test.clone());

    let mut controller = SessionController::start_by_test_id(
        Arc::clone(&backend) as Arc<dyn TestBackend>,
        fixed_clock(),
        TestId::new(1),
    )
    .await
    .unwrap();

    for index in 0..test.question_count() {
        controller.handle(SessionEvent::Jump(index)).await.unwrap();
        let view = controller.view();
        assert_eq!(view.question_text, test.question(index).unwrap().text());
        assert_eq!(view.progress.current, index + 1);
    }
}

#[tokio::test]
async fn revisited_choice_redisplays_highlighted() {
    let backend = Arc::new(InMemoryBackend::new());
    backend.insert_test(
        Test::new(
            TestId::new(1),
            "Revisit",
            None,
            vec![single_choice(1, &["A", "B"]), single_choice(2, &["A"])],
        )
        .unwrap(),
    );

    let mut controller = SessionController::start_by_test_id(
        Arc::clone(&backend) as Arc<dyn TestBackend>,
        fixed_clock(),
        TestId::new(1),
    )
    .await
    .unwrap();

    controller
        .handle(SessionEvent::SelectOption(1))
        .await
        .unwrap();
    controller.handle(SessionEvent::Next).await.unwrap();
    controller.handle(SessionEvent::Previous).await.unwrap();

    let view: SessionView = controller.view();
    match view.body {
        QuestionBody::Choices { options, .. } => {
            assert!(!options[0].selected);
            assert!(options[1].selected);
        }
        QuestionBody::TextEntry { .. } => panic!("expected choices"),
    }
}
