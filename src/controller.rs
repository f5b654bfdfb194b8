//! QuizController: one per video. Couples the player's playback state to the
//! question list and decides when to interrupt playback.
//!
//! Lifecycle:
//! 1. construction registers with the shared [`PlayerLoaderService`] and
//!    creates the player now or once the library is ready
//! 2. a `Playing` notification arms a poll; `Paused`/`Ended` cancel it
//! 3. each poll compares the playhead against pending questions and either
//!    reschedules or pauses and shows the first due question
//! 4. Continue resumes playback and re-arms the poll

use crate::config::QuizConfig;
use crate::loader::{DeferredPlayer, PlayerLoaderService};
use crate::player::{PlayerEvents, PlayerFactory, PlayerState, VideoPlayer};
use crate::presenter::{Judgement, QuestionForm, Submission};
use crate::question::{self, Question};
use crate::render::{self, ElementIds, RenderTarget};
use crate::time::format_time_code;
use crate::timer::PollTimer;
use crate::Result;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Host-owned collaborators shared by every widget on a page
#[derive(Clone)]
pub struct QuizContext {
    pub config: QuizConfig,
    pub loader: Arc<PlayerLoaderService>,
    pub target: Arc<dyn RenderTarget>,
    pub factory: Arc<dyn PlayerFactory>,
}

impl QuizContext {
    /// Validate `config` and create a fresh loader for this page.
    pub fn new(
        config: QuizConfig,
        target: Arc<dyn RenderTarget>,
        factory: Arc<dyn PlayerFactory>,
    ) -> Result<Self> {
        config.validate()?;
        let loader = Arc::new(PlayerLoaderService::new(config.library_url.clone()));
        Ok(Self {
            config,
            loader,
            target,
            factory,
        })
    }
}

pub struct QuizController {
    video_id: String,
    ids: ElementIds,
    config: QuizConfig,
    questions: Mutex<Vec<Question>>,
    // The factory owns the player; we only reference it.
    player: Mutex<Option<Weak<dyn VideoPlayer>>>,
    ready: AtomicBool,
    timer: PollTimer,
    active: Mutex<Option<QuestionForm>>,
    target: Arc<dyn RenderTarget>,
    factory: Arc<dyn PlayerFactory>,
    self_ref: Weak<QuizController>,
}

impl QuizController {
    /// Create a widget for `video_id`. Must be called inside a tokio runtime.
    ///
    /// The host keeps the returned `Arc`; the loader and player only hold weak
    /// references, so dropping it tears the widget down.
    pub fn new(
        video_id: impl Into<String>,
        questions: Vec<Question>,
        ctx: &QuizContext,
    ) -> Result<Arc<Self>> {
        let video_id = video_id.into();
        render::validate_video_id(&video_id)?;
        let timer = PollTimer::new()?;
        let ids = ElementIds::for_video(&video_id);

        let controller = Arc::new_cyclic(|self_ref| QuizController {
            video_id,
            ids,
            config: ctx.config.clone(),
            questions: Mutex::new(questions),
            player: Mutex::new(None),
            ready: AtomicBool::new(false),
            timer,
            active: Mutex::new(None),
            target: ctx.target.clone(),
            factory: ctx.factory.clone(),
            self_ref: self_ref.clone(),
        });

        controller.target.ensure_container(&controller.ids.player);
        controller.target.ensure_container(&controller.ids.question);

        ctx.loader.ensure_loading(ctx.target.as_ref());
        let waiter: Weak<dyn DeferredPlayer> = controller.self_ref.clone();
        if ctx.loader.register_or_ready(&controller.video_id, waiter) {
            controller.create_player();
        }
        Ok(controller)
    }

    /// Parse the page's JSON question list and build a widget from it.
    pub fn from_json(video_id: impl Into<String>, json: &str, ctx: &QuizContext) -> Result<Arc<Self>> {
        let questions = question::parse_questions(json)?;
        Self::new(video_id, questions, ctx)
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn ids(&self) -> &ElementIds {
        &self.ids
    }

    /// Snapshot of the question list, including completion flags
    pub fn questions(&self) -> Vec<Question> {
        self.questions.lock().unwrap().clone()
    }

    pub fn player(&self) -> Option<Arc<dyn VideoPlayer>> {
        self.player.lock().unwrap().as_ref().and_then(Weak::upgrade)
    }

    /// Whether a created player is still alive
    pub fn has_player(&self) -> bool {
        self.player().is_some()
    }

    /// Whether the player reported ready
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Whether a poll is scheduled
    pub fn is_polling(&self) -> bool {
        self.timer.is_armed()
    }

    /// Index of the question currently displayed and awaiting Continue
    pub fn active_question(&self) -> Option<usize> {
        self.active.lock().unwrap().as_ref().map(QuestionForm::index)
    }

    /// Instantiate the player in this widget's container. Does nothing while a
    /// previously created player is still alive.
    pub fn create_player(&self) {
        if self.has_player() {
            warn!("Player for {} already exists; ignoring create request", self.video_id);
            return;
        }

        let on_ready = {
            let weak = self.self_ref.clone();
            Arc::new(move || {
                if let Some(c) = weak.upgrade() {
                    c.on_ready();
                }
            })
        };
        let on_state_change = {
            let weak = self.self_ref.clone();
            Arc::new(move |state: PlayerState| {
                if let Some(c) = weak.upgrade() {
                    c.on_state_change(state);
                }
            })
        };
        let events = PlayerEvents {
            on_ready: Some(on_ready),
            on_state_change: Some(on_state_change),
        };

        match self
            .factory
            .create(&self.ids.player, &self.video_id, &self.config.player, events)
        {
            Ok(player) => {
                *self.player.lock().unwrap() = Some(Arc::downgrade(&player));
                debug!("Created player for {} in #{}", self.video_id, self.ids.player);
            }
            Err(e) => warn!("Could not create player for {}: {}", self.video_id, e),
        }
    }

    fn on_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        info!("Player for {} is ready", self.video_id);
    }

    /// Drive the poll loop from a player state change.
    pub fn on_state_change(&self, state: PlayerState) {
        debug!("Player {} state changed: {:?}", self.video_id, state);
        match state {
            PlayerState::Playing => {
                if !self.timer.arm_if_idle(self.config.poll_interval(), self.poll_task()) {
                    debug!("Poll already pending for {}; ignoring Playing", self.video_id);
                }
            }
            PlayerState::Paused | PlayerState::Ended => {
                self.timer.cancel();
            }
            PlayerState::Other(_) => {}
        }
    }

    /// One poll: show the first due question, or schedule the next poll.
    ///
    /// Returns the index of the question shown.
    pub fn check_questions(&self) -> Option<usize> {
        let player = self.player();
        let position = player.as_ref().and_then(|p| p.current_time());
        debug!(
            "Checking questions for {} at {}",
            self.video_id,
            position.map(format_time_code).unwrap_or_else(|| "no position".into())
        );

        let due = position.and_then(|pos| {
            let mut questions = self.questions.lock().unwrap();
            let idx = question::select_due(&questions, pos)?;
            questions[idx].completed = true;
            Some((idx, questions[idx].clone()))
        });

        match due {
            Some((idx, question)) => {
                if let Some(p) = &player {
                    p.pause();
                }
                self.present(idx, &question);
                Some(idx)
            }
            None => {
                self.schedule_poll();
                None
            }
        }
    }

    fn present(&self, idx: usize, question: &Question) {
        info!(
            "Showing question {} for {} (due at {})",
            idx, self.video_id, question.time()
        );
        match QuestionForm::render(self.target.as_ref(), &self.ids, idx, question) {
            Ok(form) => *self.active.lock().unwrap() = Some(form),
            Err(e) => warn!("Question {} for {} not shown: {}", idx, self.video_id, e),
        }
    }

    /// Change/input event on the displayed form.
    pub fn input_changed(&self) -> bool {
        match self.active.lock().unwrap().as_mut() {
            Some(form) => form.on_input(self.target.as_ref()),
            None => false,
        }
    }

    /// Submit the displayed form. `None` when nothing is displayed or the
    /// submission was ignored.
    pub fn submit_answer(&self, submission: Submission) -> Option<Judgement> {
        let judgement = self
            .active
            .lock()
            .unwrap()
            .as_mut()
            .and_then(|form| form.submit(self.target.as_ref(), submission));
        if let Some(j) = judgement {
            debug!("Answer for {} judged {:?}", self.video_id, j);
        }
        judgement
    }

    /// Continue click: dismiss the question, resume playback and re-arm the
    /// poll. Returns `false` when no question was displayed.
    pub fn continue_playback(&self) -> bool {
        let Some(form) = self.active.lock().unwrap().take() else {
            return false;
        };
        debug!("Continuing {} after question {}", self.video_id, form.index());
        if let Some(p) = self.player() {
            p.play();
        }
        // play() may or may not notify Playing; arm replaces whatever it scheduled
        self.schedule_poll();
        true
    }

    /// Mark every question unanswered so it can fire again.
    pub fn reset_questions(&self) {
        for q in self.questions.lock().unwrap().iter_mut() {
            q.completed = false;
        }
        debug!("Reset questions for {}", self.video_id);
    }

    fn schedule_poll(&self) {
        self.timer.arm(self.config.poll_interval(), self.poll_task());
    }

    fn poll_task(&self) -> impl FnOnce() + Send + 'static {
        let weak = self.self_ref.clone();
        move || {
            if let Some(c) = weak.upgrade() {
                c.check_questions();
            }
        }
    }
}

impl DeferredPlayer for QuizController {
    fn create_player(&self) {
        QuizController::create_player(self);
    }
}
