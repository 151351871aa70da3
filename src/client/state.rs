//! Client state management.

use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::models::{QuizDetail, QuizSummary, TestHistory};
use crate::protocol::{ClientMessage, NewTestHistory, Request, Response, ServerMessage, SessionUser};

use super::forms::{AuthForm, AuthMode, Effect, GenerateForm, Purpose, Review};
use super::quiz_run::QuizRun;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DashboardTab {
    #[default]
    Public,
    Mine,
}

/// Quiz catalogue shown after login.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub tab: DashboardTab,
    pub public: Vec<QuizSummary>,
    pub mine: Vec<QuizDetail>,
    pub selected: usize,
    pub loading: bool,
}

impl Dashboard {
    pub fn len(&self) -> usize {
        match self.tab {
            DashboardTab::Public => self.public.len(),
            DashboardTab::Mine => self.mine.len(),
        }
    }

    pub fn switch_tab(&mut self) {
        self.tab = match self.tab {
            DashboardTab::Public => DashboardTab::Mine,
            DashboardTab::Mine => DashboardTab::Public,
        };
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_public(&self) -> Option<&QuizSummary> {
        (self.tab == DashboardTab::Public)
            .then(|| self.public.get(self.selected))
            .flatten()
    }

    pub fn selected_mine(&self) -> Option<&QuizDetail> {
        (self.tab == DashboardTab::Mine)
            .then(|| self.mine.get(self.selected))
            .flatten()
    }

    fn clamp(&mut self) {
        self.selected = self.selected.min(self.len().saturating_sub(1));
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryView {
    pub results: Vec<TestHistory>,
    pub selected: usize,
    pub loading: bool,
}

impl HistoryView {
    pub fn select_next(&mut self) {
        if self.selected + 1 < self.results.len() {
            self.selected += 1;
        }
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn current(&self) -> Option<&TestHistory> {
        self.results.get(self.selected)
    }
}

/// Screen to return to from a result breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Back {
    Dashboard,
    History,
}

#[derive(Debug, Clone)]
pub struct QuizOutcome {
    pub result: NewTestHistory,
    pub scroll: usize,
    pub time_up: bool,
    pub saved: bool,
    pub back: Back,
}

impl QuizOutcome {
    pub fn from_history(history: &TestHistory) -> Self {
        Self {
            result: NewTestHistory {
                quiz_id: history.quiz_id.clone(),
                quiz_name: history.quiz_name.clone(),
                date: history.date,
                score: history.score,
                total: history.total,
                topic: history.topic.clone(),
                difficulty: history.difficulty.clone(),
                answers: history.answers.clone(),
            },
            scroll: 0,
            time_up: false,
            saved: true,
            back: Back::History,
        }
    }

    pub fn scroll_down(&mut self) {
        let max_scroll = self.result.answers.len().saturating_sub(1);
        self.scroll = (self.scroll + 1).min(max_scroll);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

/// Current screen of the client.
#[derive(Debug, Clone, Default)]
pub enum ClientState {
    /// Connecting to server.
    #[default]
    Connecting,
    Auth(AuthForm),
    Dashboard(Dashboard),
    Quiz(QuizRun),
    Results(QuizOutcome),
    History(HistoryView),
    Generate(GenerateForm),
    Review(Review),
    /// Disconnected from server.
    Disconnected { message: String },
}

/// Client application state.
pub struct ClientApp {
    pub state: ClientState,
    pub host: String,
    pub port: u16,
    pub should_quit: bool,
    pub session: Option<SessionUser>,
    /// One-line notice shown in the footer.
    pub flash: Option<String>,
    next_id: u64,
    outbox: Vec<Request>,
    effects: Vec<Effect>,
}

impl ClientApp {
    pub fn new(host: String, port: u16) -> Self {
        Self {
            state: ClientState::Connecting,
            host,
            port,
            should_quit: false,
            session: None,
            flash: None,
            next_id: 1,
            outbox: Vec::new(),
            effects: Vec::new(),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Queue a request, attaching the session token when logged in.
    pub fn send(&mut self, message: ClientMessage) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.outbox.push(Request {
            id,
            token: self.session.as_ref().map(|s| s.token.clone()),
            message,
        });
        id
    }

    pub fn take_outbox(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.outbox)
    }

    pub fn queue(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn disconnect(&mut self, message: String) {
        self.state = ClientState::Disconnected { message };
    }

    pub fn logout(&mut self) {
        self.session = None;
        self.state = ClientState::Auth(AuthForm::new(AuthMode::Login));
    }

    /// Show the quiz catalogue and refresh both lists.
    pub fn enter_dashboard(&mut self, tab: DashboardTab) {
        self.state = ClientState::Dashboard(Dashboard {
            tab,
            loading: true,
            ..Dashboard::default()
        });
        self.send(ClientMessage::ListPublicQuizzes);
        self.send(ClientMessage::ListMyQuizzes);
    }

    pub fn enter_history(&mut self) {
        self.state = ClientState::History(HistoryView {
            loading: true,
            ..HistoryView::default()
        });
        self.send(ClientMessage::ListTestHistory);
    }

    pub fn enter_generate(&mut self, purpose: Purpose) {
        self.state = ClientState::Generate(GenerateForm::new(purpose));
    }

    /// Score the running quiz, save it to history and show the breakdown.
    pub fn submit_quiz(&mut self, date: DateTime<Utc>, time_up: bool) {
        let ClientState::Quiz(run) = &self.state else {
            return;
        };
        let result = run.finish(date);
        self.send(ClientMessage::SaveTestHistory {
            result: result.clone(),
        });
        self.state = ClientState::Results(QuizOutcome {
            result,
            scroll: 0,
            time_up,
            saved: false,
            back: Back::Dashboard,
        });
    }

    /// Advance timers. Submits the quiz when time runs out.
    pub fn tick(&mut self, now: Instant, date: DateTime<Utc>) {
        if let ClientState::Quiz(run) = &self.state {
            if run.is_expired(now) {
                self.submit_quiz(date, true);
            }
        }
    }

    /// The result of a background effect that could not be carried out.
    pub fn effect_failed(&mut self, message: String) {
        if let ClientState::Generate(form) = &mut self.state {
            form.busy = false;
            form.error = Some(message);
        } else {
            self.flash = Some(message);
        }
    }

    pub fn handle_response(&mut self, response: Response) {
        match response.message {
            ServerMessage::ConnectionAck { .. } => {
                if matches!(self.state, ClientState::Connecting) {
                    self.state = ClientState::Auth(AuthForm::new(AuthMode::Login));
                }
            }
            ServerMessage::Session { message, user } => {
                self.session = Some(user);
                self.flash = Some(message);
                self.enter_dashboard(DashboardTab::Public);
            }
            ServerMessage::Profile { .. } => {}
            ServerMessage::Done { message } => {
                self.flash = Some(message);
                match self.state {
                    ClientState::Dashboard(Dashboard { tab, .. }) => self.enter_dashboard(tab),
                    ClientState::History(_) => self.enter_history(),
                    _ => {}
                }
            }
            ServerMessage::QuizSaved { message, .. } => {
                self.flash = Some(message);
                self.enter_dashboard(DashboardTab::Mine);
            }
            ServerMessage::PublicQuizzes { quizzes } => {
                if let ClientState::Dashboard(dashboard) = &mut self.state {
                    dashboard.public = quizzes;
                    dashboard.loading = false;
                    dashboard.clamp();
                }
            }
            ServerMessage::MyQuizzes { quizzes } => {
                if let ClientState::Dashboard(dashboard) = &mut self.state {
                    dashboard.mine = quizzes;
                    dashboard.loading = false;
                    dashboard.clamp();
                }
            }
            ServerMessage::Quiz { quiz } => {
                if matches!(self.state, ClientState::Dashboard(_)) {
                    self.start_quiz(quiz);
                }
            }
            ServerMessage::HistorySaved { .. } => {
                if let ClientState::Results(outcome) = &mut self.state {
                    outcome.saved = true;
                }
            }
            ServerMessage::History { results } => {
                if let ClientState::History(view) = &mut self.state {
                    view.results = results;
                    view.loading = false;
                    view.selected = view.selected.min(view.results.len().saturating_sub(1));
                }
            }
            ServerMessage::Mcqs { mcqs, .. } => {
                let ClientState::Generate(form) = &mut self.state else {
                    return;
                };
                if !form.busy {
                    return;
                }
                if mcqs.is_empty() {
                    form.busy = false;
                    form.error = Some("No questions were generated, please try again".to_string());
                    return;
                }
                self.state = match form.purpose {
                    Purpose::Mock => ClientState::Quiz(QuizRun::mock(
                        form.topic_label(),
                        form.difficulty,
                        mcqs,
                        Instant::now(),
                        Utc::now(),
                    )),
                    Purpose::Create => ClientState::Review(Review::generated(
                        form.name.value.trim().to_string(),
                        form.topic_label(),
                        form.difficulty,
                        mcqs,
                    )),
                };
            }
            ServerMessage::PdfTopics { pdf_id, topics } => {
                if let ClientState::Generate(form) = &mut self.state {
                    form.set_topics(pdf_id, topics);
                }
            }
            ServerMessage::Error { status, error, details } => self.handle_error(status, error, details),
        }
    }

    pub fn start_quiz(&mut self, quiz: QuizDetail) {
        if quiz.questions.is_empty() {
            self.flash = Some("This quiz has no questions".to_string());
            return;
        }
        self.state = ClientState::Quiz(QuizRun::saved(quiz, Instant::now()));
    }

    fn handle_error(&mut self, status: u16, error: String, details: Option<String>) {
        if matches!(status, 401 | 403) && self.session.is_some() {
            self.logout();
            if let ClientState::Auth(form) = &mut self.state {
                form.error = Some("Session expired, please log in again".to_string());
            }
            return;
        }

        let message = match details {
            Some(details) => format!("{error}: {details}"),
            None => error,
        };
        match &mut self.state {
            ClientState::Auth(form) => {
                form.busy = false;
                form.error = Some(message);
            }
            ClientState::Generate(form) => {
                form.busy = false;
                form.error = Some(message);
            }
            ClientState::Review(review) => {
                review.busy = false;
                review.error = Some(message);
            }
            ClientState::Dashboard(dashboard) => {
                dashboard.loading = false;
                self.flash = Some(message);
            }
            ClientState::History(view) => {
                view.loading = false;
                self.flash = Some(message);
            }
            ClientState::Results(_) => {
                self.flash = Some(format!("Result not saved: {message}"));
            }
            _ => self.flash = Some(message),
        }
    }
}
