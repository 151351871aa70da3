//! Keyboard handling for each screen.

use chrono::Utc;
use crossterm::event::KeyCode;

use crate::models::QuestionStatus;
use crate::protocol::ClientMessage;

use super::forms::{GenerateAction, GenerateField, Purpose, Review};
use super::state::{Back, ClientApp, ClientState, DashboardTab, QuizOutcome};

/// Apply one key press to the app.
pub fn handle_key(app: &mut ClientApp, key: KeyCode) {
    app.flash = None;

    match &app.state {
        ClientState::Connecting | ClientState::Disconnected { .. } => {
            if matches!(key, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc | KeyCode::Enter) {
                app.should_quit = true;
            }
        }
        ClientState::Auth(_) => auth_key(app, key),
        ClientState::Dashboard(_) => dashboard_key(app, key),
        ClientState::Quiz(_) => quiz_key(app, key),
        ClientState::Results(_) => results_key(app, key),
        ClientState::History(_) => history_key(app, key),
        ClientState::Generate(_) => generate_key(app, key),
        ClientState::Review(_) => review_key(app, key),
    }
}

fn auth_key(app: &mut ClientApp, key: KeyCode) {
    let ClientState::Auth(form) = &mut app.state else {
        return;
    };

    match key {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_previous(),
        KeyCode::Left | KeyCode::Right => form.toggle_mode(),
        KeyCode::Char(c) => {
            form.error = None;
            form.focused_mut().push(c);
        }
        KeyCode::Backspace => {
            form.error = None;
            form.focused_mut().pop();
        }
        KeyCode::Enter if !form.busy => match form.submit() {
            Ok(message) => {
                form.busy = true;
                form.error = None;
                app.send(message);
            }
            Err(e) => form.error = Some(e),
        },
        _ => {}
    }
}

fn dashboard_key(app: &mut ClientApp, key: KeyCode) {
    let ClientState::Dashboard(dashboard) = &mut app.state else {
        return;
    };

    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Tab | KeyCode::Left | KeyCode::Right => dashboard.switch_tab(),
        KeyCode::Down | KeyCode::Char('j') => dashboard.select_next(),
        KeyCode::Up | KeyCode::Char('k') => dashboard.select_previous(),
        KeyCode::Enter => {
            if let Some(summary) = dashboard.selected_public() {
                let quiz_id = summary.id;
                app.send(ClientMessage::GetQuiz { quiz_id });
            } else if let Some(quiz) = dashboard.selected_mine().cloned() {
                app.start_quiz(quiz);
            }
        }
        KeyCode::Char('e') => {
            if let Some(quiz) = dashboard.selected_mine().cloned() {
                app.state = ClientState::Review(Review::existing(quiz));
            }
        }
        KeyCode::Char('x') => {
            if let Some(quiz) = dashboard.selected_mine() {
                let quiz_id = quiz.id;
                app.send(ClientMessage::DeleteQuiz { quiz_id });
            }
        }
        KeyCode::Char('n') => app.enter_generate(Purpose::Create),
        KeyCode::Char('m') => app.enter_generate(Purpose::Mock),
        KeyCode::Char('h') => app.enter_history(),
        KeyCode::Char('r') => {
            let tab = dashboard.tab;
            app.enter_dashboard(tab);
        }
        KeyCode::Char('l') => app.logout(),
        _ => {}
    }
}

fn quiz_key(app: &mut ClientApp, key: KeyCode) {
    let ClientState::Quiz(run) = &mut app.state else {
        return;
    };

    match key {
        KeyCode::Up | KeyCode::Char('k') => run.cursor_up(),
        KeyCode::Down | KeyCode::Char('j') => run.cursor_down(),
        KeyCode::Enter | KeyCode::Char(' ') => {
            run.choose();
            run.next();
        }
        KeyCode::Right | KeyCode::Char('n') => {
            run.next();
        }
        KeyCode::Left | KeyCode::Char('p') => run.previous(),
        KeyCode::Char('s') => app.submit_quiz(Utc::now(), false),
        KeyCode::Esc => app.enter_dashboard(DashboardTab::Public),
        _ => {}
    }
}

fn results_key(app: &mut ClientApp, key: KeyCode) {
    let ClientState::Results(outcome) = &mut app.state else {
        return;
    };

    match key {
        KeyCode::Down | KeyCode::Char('j') => outcome.scroll_down(),
        KeyCode::Up | KeyCode::Char('k') => outcome.scroll_up(),
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => match outcome.back {
            Back::Dashboard => app.enter_dashboard(DashboardTab::Public),
            Back::History => app.enter_history(),
        },
        _ => {}
    }
}

fn history_key(app: &mut ClientApp, key: KeyCode) {
    let ClientState::History(view) = &mut app.state else {
        return;
    };

    match key {
        KeyCode::Down | KeyCode::Char('j') => view.select_next(),
        KeyCode::Up | KeyCode::Char('k') => view.select_previous(),
        KeyCode::Enter => {
            if let Some(history) = view.current() {
                app.state = ClientState::Results(QuizOutcome::from_history(history));
            }
        }
        KeyCode::Char('d') => {
            if let Some(history) = view.current() {
                let history_id = history.id;
                app.send(ClientMessage::DeleteTestHistory { history_id });
            }
        }
        KeyCode::Char('r') => app.enter_history(),
        KeyCode::Esc | KeyCode::Char('q') => app.enter_dashboard(DashboardTab::Public),
        _ => {}
    }
}

fn generate_key(app: &mut ClientApp, key: KeyCode) {
    let ClientState::Generate(form) = &mut app.state else {
        return;
    };
    if form.busy {
        if key == KeyCode::Esc {
            app.enter_dashboard(DashboardTab::Public);
        }
        return;
    }

    let choice = matches!(
        form.focused(),
        GenerateField::Source | GenerateField::Difficulty | GenerateField::Wikipedia | GenerateField::PdfTopic
    );
    match key {
        KeyCode::Esc => app.enter_dashboard(DashboardTab::Public),
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_previous(),
        KeyCode::Left | KeyCode::Right => form.cycle(),
        KeyCode::Char(' ') if choice => form.cycle(),
        KeyCode::Char(c) => {
            form.error = None;
            form.type_char(c);
        }
        KeyCode::Backspace => {
            form.error = None;
            form.backspace();
        }
        KeyCode::Enter => match form.submit() {
            Ok(action) => {
                form.busy = true;
                form.error = None;
                match action {
                    GenerateAction::Run(effect) => app.queue(effect),
                    GenerateAction::Send(message) => {
                        app.send(message);
                    }
                }
            }
            Err(e) => form.error = Some(e),
        },
        _ => {}
    }
}

fn review_key(app: &mut ClientApp, key: KeyCode) {
    let ClientState::Review(review) = &mut app.state else {
        return;
    };
    if review.busy {
        return;
    }

    match key {
        KeyCode::Down | KeyCode::Char('j') => review.select_next(),
        KeyCode::Up | KeyCode::Char('k') => review.select_previous(),
        KeyCode::Char('a') => review.mark(QuestionStatus::Accepted),
        KeyCode::Char('r') => review.mark(QuestionStatus::Rejected),
        KeyCode::Char('A') => review.accept_all(),
        KeyCode::Char('s') => match review.submit() {
            Ok(message) => {
                review.busy = true;
                review.error = None;
                app.send(message);
            }
            Err(e) => review.error = Some(e),
        },
        KeyCode::Esc => {
            let tab = match review.editing {
                Some(_) => DashboardTab::Mine,
                None => DashboardTab::Public,
            };
            app.enter_dashboard(tab);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::forms::Effect;
    use crate::client::state::tests::{logged_in, quiz, reply};
    use crate::models::Difficulty;
    use crate::protocol::ServerMessage;

    fn type_text(app: &mut ClientApp, text: &str) {
        text.chars().for_each(|c| handle_key(app, KeyCode::Char(c)));
    }

    #[test]
    fn test_login_keys() {
        let mut app = ClientApp::new("localhost".to_string(), 5000);
        app.state = ClientState::Auth(crate::client::forms::AuthForm::new(
            crate::client::forms::AuthMode::Login,
        ));

        handle_key(&mut app, KeyCode::Enter);
        assert!(app.take_outbox().is_empty());

        type_text(&mut app, "ada");
        handle_key(&mut app, KeyCode::Tab);
        type_text(&mut app, "engine");
        handle_key(&mut app, KeyCode::Enter);
        // A second Enter while waiting does nothing.
        handle_key(&mut app, KeyCode::Enter);

        let outbox = app.take_outbox();
        assert_eq!(outbox.len(), 1);
        assert!(outbox[0].token.is_none());
        let ClientMessage::Login { username, .. } = &outbox[0].message else {
            panic!("expected login");
        };
        assert_eq!(username, "ada");
        assert!(!app.should_quit);
    }

    #[test]
    fn test_take_public_quiz() {
        let mut app = logged_in();
        let listed = quiz(2);
        let summary = crate::models::QuizSummary {
            id: listed.id,
            name: listed.name.clone(),
            topic: listed.topic.clone(),
            difficulty: listed.difficulty,
            question_count: 2,
            created_by: None,
            created_at: listed.created_at,
        };
        app.handle_response(reply(ServerMessage::PublicQuizzes {
            quizzes: vec![summary],
        }));

        handle_key(&mut app, KeyCode::Enter);
        let outbox = app.take_outbox();
        assert_eq!(outbox[0].message, ClientMessage::GetQuiz { quiz_id: listed.id });

        app.handle_response(reply(ServerMessage::Quiz { quiz: listed }));
        handle_key(&mut app, KeyCode::Enter);
        handle_key(&mut app, KeyCode::Char('j'));
        handle_key(&mut app, KeyCode::Enter);
        handle_key(&mut app, KeyCode::Char('s'));

        let ClientState::Results(outcome) = &app.state else {
            panic!("expected results");
        };
        assert_eq!(outcome.result.score, 1);
        assert_eq!(outcome.result.total, 2);
        assert!(!outcome.time_up);
        assert!(matches!(
            app.take_outbox()[0].message,
            ClientMessage::SaveTestHistory { .. }
        ));

        handle_key(&mut app, KeyCode::Enter);
        assert!(matches!(app.state, ClientState::Dashboard(_)));
    }

    #[test]
    fn test_edit_and_delete_own_quiz() {
        let mut app = logged_in();
        let mine = quiz(1);
        app.handle_response(reply(ServerMessage::MyQuizzes {
            quizzes: vec![mine.clone()],
        }));
        handle_key(&mut app, KeyCode::Tab);

        handle_key(&mut app, KeyCode::Char('x'));
        assert_eq!(
            app.take_outbox()[0].message,
            ClientMessage::DeleteQuiz { quiz_id: mine.id }
        );

        handle_key(&mut app, KeyCode::Char('e'));
        let ClientState::Review(review) = &app.state else {
            panic!("expected review");
        };
        assert_eq!(review.editing, Some(mine.id));

        handle_key(&mut app, KeyCode::Char('A'));
        handle_key(&mut app, KeyCode::Char('s'));
        let outbox = app.take_outbox();
        let ClientMessage::UpdateQuiz { quiz_id, quiz } = &outbox[0].message else {
            panic!("expected update");
        };
        assert_eq!(*quiz_id, mine.id);
        assert_eq!(quiz.question_count, 1);
    }

    #[test]
    fn test_generate_queues_effect() {
        let mut app = logged_in();
        handle_key(&mut app, KeyCode::Char('m'));
        assert!(matches!(app.state, ClientState::Generate(_)));

        handle_key(&mut app, KeyCode::Tab);
        type_text(&mut app, "Traits");
        handle_key(&mut app, KeyCode::Tab);
        handle_key(&mut app, KeyCode::Char(' '));
        handle_key(&mut app, KeyCode::Tab);
        handle_key(&mut app, KeyCode::Backspace);
        handle_key(&mut app, KeyCode::Backspace);
        type_text(&mut app, "5");
        handle_key(&mut app, KeyCode::Tab);
        handle_key(&mut app, KeyCode::Char(' '));
        handle_key(&mut app, KeyCode::Enter);

        assert_eq!(
            app.take_effects(),
            vec![Effect::GenerateFromTopic {
                topic: "Traits".to_string(),
                difficulty: Difficulty::Hard,
                count: 5,
                wikipedia: false,
            }]
        );
        assert!(app.take_outbox().is_empty());
    }

    #[test]
    fn test_history_detail_and_back() {
        let mut app = logged_in();
        handle_key(&mut app, KeyCode::Char('h'));
        assert!(matches!(
            app.take_outbox()[0].message,
            ClientMessage::ListTestHistory
        ));

        let history = crate::models::TestHistory {
            id: uuid::Uuid::new_v4(),
            user: uuid::Uuid::new_v4(),
            quiz_id: "mock-1".to_string(),
            quiz_name: "Mock Quiz: Rust".to_string(),
            date: Utc::now(),
            score: 3,
            total: 4,
            topic: "Rust".to_string(),
            difficulty: "easy".to_string(),
            answers: Vec::new(),
        };
        app.handle_response(reply(ServerMessage::History {
            results: vec![history.clone()],
        }));

        handle_key(&mut app, KeyCode::Char('d'));
        assert_eq!(
            app.take_outbox()[0].message,
            ClientMessage::DeleteTestHistory { history_id: history.id }
        );

        handle_key(&mut app, KeyCode::Enter);
        let ClientState::Results(outcome) = &app.state else {
            panic!("expected results");
        };
        assert_eq!(outcome.back, Back::History);
        assert_eq!(outcome.result.score, 3);

        handle_key(&mut app, KeyCode::Esc);
        assert!(matches!(app.state, ClientState::History(_)));
    }
}
