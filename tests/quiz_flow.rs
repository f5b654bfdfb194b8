#![cfg(feature = "headless")]

//! End-to-end widget behaviour against the in-memory player and page.

use std::sync::Arc;
use std::time::Duration;
use ytquiz::player::{MemoryPlayer, MemoryPlayerFactory};
use ytquiz::render::{HeadlessPage, RenderTarget};
use ytquiz::{
    Error, Judgement, PlayerState, Question, QuizConfig, QuizContext, QuizController, Result,
    Submission, VideoPlayer,
};

const TICK: Duration = Duration::from_millis(1001);

struct Widget {
    quiz: Arc<QuizController>,
    player: Arc<MemoryPlayer>,
    page: Arc<HeadlessPage>,
}

fn capitals(time: u32) -> Question {
    Question::multiple_choice(
        time,
        format!("Question at {}", time),
        vec!["Paris".into(), "London".into(), "Berlin".into(), "Madrid".into()],
        2,
    )
    .unwrap()
}

fn widget_with(factory: Arc<MemoryPlayerFactory>, questions: Vec<Question>) -> Widget {
    let page = Arc::new(HeadlessPage::new());
    let ctx = QuizContext::new(QuizConfig::default(), page.clone(), factory.clone()).unwrap();
    let quiz = QuizController::new("M7lc1UVf-VE", questions, &ctx).unwrap();
    ctx.loader.on_library_ready();
    let player = factory.player("M7lc1UVf-VE").expect("player created on ready");
    player.emit_ready();
    Widget { quiz, player, page }
}

fn widget(questions: Vec<Question>) -> Widget {
    widget_with(Arc::new(MemoryPlayerFactory::new()), questions)
}

fn completed(quiz: &QuizController) -> Vec<bool> {
    quiz.questions().iter().map(|q| q.completed).collect()
}

#[tokio::test(start_paused = true)]
async fn first_listed_due_question_fires_first() {
    let w = widget([2, 5, 10, 15].into_iter().map(capitals).collect());
    w.player.set_position(Some(6.0));
    w.player.emit_state(PlayerState::Playing);
    assert!(w.quiz.is_polling());

    tokio::time::sleep(TICK).await;

    // both 2 and 5 are due; list order picks the one at 2
    assert_eq!(w.quiz.active_question(), Some(0));
    assert_eq!(completed(&w.quiz), vec![true, false, false, false]);
    assert_eq!(w.player.state(), PlayerState::Paused);
    assert_eq!(w.player.pause_count(), 1);
    assert_eq!(w.page.text("M7lc1UVf-VE-prompt").as_deref(), Some("Question at 2"));

    // nothing else happens until Continue
    assert!(!w.quiz.is_polling());
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(w.quiz.active_question(), Some(0));
    assert_eq!(w.player.pause_count(), 1);

    assert!(w.quiz.continue_playback());
    assert_eq!(w.player.state(), PlayerState::Playing);
    assert_eq!(w.quiz.active_question(), None);
    assert!(w.quiz.is_polling());

    tokio::time::sleep(TICK).await;
    assert_eq!(w.quiz.active_question(), Some(1));
    assert_eq!(completed(&w.quiz), vec![true, true, false, false]);
    assert_eq!(w.page.text("M7lc1UVf-VE-prompt").as_deref(), Some("Question at 5"));
}

#[tokio::test(start_paused = true)]
async fn polling_continues_until_a_threshold_is_crossed() {
    let w = widget(vec![capitals(10)]);
    w.player.set_position(Some(3.0));
    w.player.emit_state(PlayerState::Playing);

    for _ in 0..3 {
        tokio::time::sleep(TICK).await;
        assert!(w.quiz.is_polling());
        assert_eq!(w.quiz.active_question(), None);
    }

    w.player.set_position(Some(10.0));
    tokio::time::sleep(TICK).await;
    assert_eq!(w.quiz.active_question(), Some(0));
    assert!(!w.quiz.is_polling());
}

#[tokio::test(start_paused = true)]
async fn missing_position_is_not_yet() {
    let w = widget(vec![capitals(0)]);
    w.player.emit_state(PlayerState::Playing);

    tokio::time::sleep(TICK).await;
    assert_eq!(w.quiz.active_question(), None);
    assert!(w.quiz.is_polling());
    assert_eq!(completed(&w.quiz), vec![false]);

    w.player.set_position(Some(0.5));
    tokio::time::sleep(TICK).await;
    assert_eq!(w.quiz.active_question(), Some(0));
}

#[tokio::test(start_paused = true)]
async fn pause_and_end_cancel_the_poll() {
    let w = widget(vec![capitals(1)]);
    w.player.set_position(Some(5.0));

    w.player.emit_state(PlayerState::Playing);
    w.player.emit_state(PlayerState::Paused);
    assert!(!w.quiz.is_polling());
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(w.quiz.active_question(), None);

    w.player.emit_state(PlayerState::Playing);
    w.player.emit_state(PlayerState::Ended);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(completed(&w.quiz), vec![false]);

    // cancelling with nothing pending is fine
    w.player.emit_state(PlayerState::Paused);
    // buffering and friends change nothing
    w.player.emit_state(PlayerState::Other(3));
    assert!(!w.quiz.is_polling());
}

#[tokio::test(start_paused = true)]
async fn repeated_playing_keeps_one_poll() {
    let w = widget(vec![capitals(1), capitals(1)]);
    w.player.set_position(Some(2.0));
    w.player.emit_state(PlayerState::Playing);
    w.player.emit_state(PlayerState::Playing);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(w.quiz.active_question(), Some(0));
    assert_eq!(completed(&w.quiz), vec![true, false]);
    assert_eq!(w.player.pause_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn continue_rearms_when_player_stays_silent() {
    let w = widget_with(
        Arc::new(MemoryPlayerFactory::silent()),
        vec![capitals(1), capitals(2)],
    );
    w.player.set_position(Some(3.0));
    w.player.emit_state(PlayerState::Playing);

    tokio::time::sleep(TICK).await;
    assert_eq!(w.quiz.active_question(), Some(0));

    assert!(w.quiz.continue_playback());
    assert_eq!(w.player.play_count(), 1);
    assert!(w.quiz.is_polling());

    tokio::time::sleep(TICK).await;
    assert_eq!(w.quiz.active_question(), Some(1));
    assert_eq!(w.player.pause_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn continue_without_question_does_nothing() {
    let w = widget(vec![capitals(1)]);
    assert!(!w.quiz.continue_playback());
    assert_eq!(w.player.play_count(), 0);
    assert!(!w.quiz.is_polling());
}

#[tokio::test(start_paused = true)]
async fn completed_questions_keep_polling_quietly() {
    let w = widget(vec![capitals(1)]);
    w.player.set_position(Some(1.0));
    w.player.emit_state(PlayerState::Playing);
    tokio::time::sleep(TICK).await;
    assert!(w.quiz.continue_playback());

    for _ in 0..3 {
        tokio::time::sleep(TICK).await;
        assert_eq!(w.quiz.active_question(), None);
        assert!(w.quiz.is_polling());
    }
    assert_eq!(w.player.pause_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn multiple_choice_judging() {
    let w = widget(vec![capitals(1)]);
    w.player.set_position(Some(1.0));
    assert_eq!(w.quiz.check_questions(), Some(0));

    let ids = w.quiz.ids().clone();
    assert!(w.page.has_attribute(&ids.submit, "disabled"));
    assert_eq!(w.quiz.submit_answer(Submission::Choice(2)), None);

    assert!(w.quiz.input_changed());
    assert_eq!(w.quiz.submit_answer(Submission::Choice(1)), Some(Judgement::Incorrect));
    assert_eq!(w.page.text(&ids.submit).as_deref(), Some("Try again"));
    assert!(!w.page.has_attribute(&ids.submit, "disabled"));
    assert_eq!(w.page.attribute(&ids.choice(1), "aria-invalid").as_deref(), Some("true"));

    assert!(w.quiz.input_changed());
    assert_eq!(w.quiz.submit_answer(Submission::Choice(2)), Some(Judgement::Correct));
    assert_eq!(w.page.text(&ids.submit).as_deref(), Some("Correct!"));
    assert!(w.page.has_attribute(&ids.submit, "disabled"));
    assert_eq!(w.page.attribute(&ids.choice(2), "aria-invalid").as_deref(), Some("false"));

    assert!(!w.quiz.input_changed());
    assert_eq!(w.quiz.submit_answer(Submission::Choice(2)), None);

    // judging never dismisses the question; only Continue does
    assert_eq!(w.quiz.active_question(), Some(0));
    assert!(!w.quiz.is_polling());
}

#[tokio::test(start_paused = true)]
async fn fill_in_blank_judging() {
    let w = widget(vec![Question::fill_in_blank(
        "0:02",
        "This is a fill in the blank question.",
        "Here is the correct answer.",
    )]);
    w.player.set_position(Some(2.0));
    assert_eq!(w.quiz.check_questions(), Some(0));

    let ids = w.quiz.ids().clone();
    assert_eq!(w.page.text(&ids.solution).as_deref(), Some(""));
    w.quiz.input_changed();
    assert_eq!(
        w.quiz.submit_answer(Submission::Text("whatever".into())),
        Some(Judgement::Thanks)
    );
    assert_eq!(w.page.text(&ids.solution).as_deref(), Some("Here is the correct answer."));
    assert_eq!(w.page.text(&ids.submit).as_deref(), Some("Thanks!"));
    assert!(w.page.has_attribute(&ids.submit, "disabled"));
}

#[tokio::test(start_paused = true)]
async fn malformed_time_never_fires() {
    let factory = Arc::new(MemoryPlayerFactory::new());
    let page = Arc::new(HeadlessPage::new());
    let ctx = QuizContext::new(QuizConfig::default(), page, factory.clone()).unwrap();
    let quiz = QuizController::from_json(
        "v",
        r#"[{"time": "whenever", "question": "?", "answers": [], "correct": "x"}]"#,
        &ctx,
    )
    .unwrap();
    ctx.loader.on_library_ready();
    let player = factory.player("v").unwrap();
    player.set_position(Some(10_000.0));
    player.emit_state(PlayerState::Playing);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(quiz.active_question(), None);
    assert!(quiz.is_polling());
}

#[tokio::test(start_paused = true)]
async fn negative_times_never_fire_from_the_start() {
    let factory = Arc::new(MemoryPlayerFactory::new());
    let page = Arc::new(HeadlessPage::new());
    let ctx = QuizContext::new(QuizConfig::default(), page, factory.clone()).unwrap();
    let quiz = QuizController::from_json(
        "v",
        r#"[{"time": -30, "question": "?", "answers": [], "correct": "x"},
            {"time": "-0:30", "question": "?", "answers": [], "correct": "x"}]"#,
        &ctx,
    )
    .unwrap();
    ctx.loader.on_library_ready();
    let player = factory.player("v").unwrap();
    player.set_position(Some(0.0));
    player.emit_state(PlayerState::Playing);

    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(quiz.active_question(), None);
    assert_eq!(player.pause_count(), 0);
    assert_eq!(completed(&quiz), vec![false, false]);
}

#[tokio::test]
async fn two_widgets_share_one_library_load() {
    let factory = Arc::new(MemoryPlayerFactory::new());
    let page = Arc::new(HeadlessPage::new());
    let ctx = QuizContext::new(QuizConfig::default(), page.clone(), factory.clone()).unwrap();

    let first = QuizController::new("M7lc1UVf-VE", vec![capitals(2)], &ctx).unwrap();
    let second = QuizController::new("X2pZ38jLKDA", vec![capitals(2)], &ctx).unwrap();

    assert_eq!(page.scripts(), vec!["https://www.youtube.com/iframe_api".to_string()]);
    assert_eq!(
        ctx.loader.pending(),
        vec!["M7lc1UVf-VE".to_string(), "X2pZ38jLKDA".to_string()]
    );
    assert_eq!(factory.created(), 0);

    ctx.loader.on_library_ready();
    ctx.loader.on_library_ready();

    assert_eq!(factory.created_for("M7lc1UVf-VE"), 1);
    assert_eq!(factory.created_for("X2pZ38jLKDA"), 1);
    assert!(first.has_player() && second.has_player());
    assert_ne!(first.ids().question, second.ids().question);
}

#[tokio::test(start_paused = true)]
async fn widgets_poll_independently() {
    let factory = Arc::new(MemoryPlayerFactory::new());
    let page = Arc::new(HeadlessPage::new());
    let ctx = QuizContext::new(QuizConfig::default(), page.clone(), factory.clone()).unwrap();
    let a = QuizController::new("a", vec![capitals(1)], &ctx).unwrap();
    let b = QuizController::new("b", vec![capitals(1)], &ctx).unwrap();
    ctx.loader.on_library_ready();

    let (pa, pb) = (factory.player("a").unwrap(), factory.player("b").unwrap());
    pa.set_position(Some(2.0));
    pb.set_position(Some(2.0));
    pa.emit_state(PlayerState::Playing);

    tokio::time::sleep(TICK).await;
    assert_eq!(a.active_question(), Some(0));
    assert_eq!(b.active_question(), None);
    assert!(page.has_element("a-question-form"));
    assert!(!page.has_element("b-question-form"));
    assert_eq!(pb.pause_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn custom_poll_interval() {
    let factory = Arc::new(MemoryPlayerFactory::new());
    let page = Arc::new(HeadlessPage::new());
    let config = QuizConfig {
        poll_interval_ms: 250,
        ..Default::default()
    };
    let ctx = QuizContext::new(config, page, factory.clone()).unwrap();
    let quiz = QuizController::new("v", vec![capitals(1)], &ctx).unwrap();
    ctx.loader.on_library_ready();
    let player = factory.player("v").unwrap();
    player.set_position(Some(1.0));
    player.emit_state(PlayerState::Playing);

    tokio::time::sleep(Duration::from_millis(260)).await;
    assert_eq!(quiz.active_question(), Some(0));
}

/// A page without any of the widget's elements.
struct EmptyPage;

impl RenderTarget for EmptyPage {
    fn has_element(&self, _id: &str) -> bool {
        false
    }
    fn ensure_container(&self, _id: &str) {}
    fn set_inner_html(&self, id: &str, _html: &str) -> Result<()> {
        Err(Error::MissingElement(id.to_string()))
    }
    fn set_text(&self, id: &str, _text: &str) -> Result<()> {
        Err(Error::MissingElement(id.to_string()))
    }
    fn set_attribute(&self, id: &str, _name: &str, _value: &str) -> Result<()> {
        Err(Error::MissingElement(id.to_string()))
    }
    fn remove_attribute(&self, id: &str, _name: &str) -> Result<()> {
        Err(Error::MissingElement(id.to_string()))
    }
    fn inject_script(&self, _src: &str) {}
}

#[tokio::test(start_paused = true)]
async fn missing_container_degrades_silently() {
    let factory = Arc::new(MemoryPlayerFactory::new());
    let ctx = QuizContext::new(QuizConfig::default(), Arc::new(EmptyPage), factory.clone()).unwrap();
    let quiz = QuizController::new("v", vec![capitals(1)], &ctx).unwrap();
    ctx.loader.on_library_ready();
    let player = factory.player("v").unwrap();
    player.set_position(Some(1.0));
    player.emit_state(PlayerState::Playing);

    tokio::time::sleep(TICK).await;
    assert_eq!(completed(&quiz), vec![true]);
    assert_eq!(quiz.active_question(), None);
    assert_eq!(player.state(), PlayerState::Paused);
    assert_eq!(quiz.submit_answer(Submission::Choice(2)), None);
    assert!(!quiz.input_changed());
}
