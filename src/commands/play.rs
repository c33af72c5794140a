use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ouroboros::{
    Direction, EndReason, FrameView, HighScoreStore, Mode, Phase, Session, SessionConfig,
};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction as LayoutDirection, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use tracing::debug;

use super::finish_session;

/// What a key press asks of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Steer(Direction),
    Quit,
}

fn key_action(code: KeyCode) -> Option<KeyAction> {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(KeyAction::Quit),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(KeyAction::Steer(Direction::Left))
        }
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(KeyAction::Steer(Direction::Right))
        }
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => {
            Some(KeyAction::Steer(Direction::Up))
        }
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(KeyAction::Steer(Direction::Down))
        }
        _ => None,
    }
}

fn menu_choice(code: KeyCode) -> Option<Option<Mode>> {
    match code {
        KeyCode::Char('1') => Some(Some(Mode::Human)),
        KeyCode::Char('2') => Some(Some(Mode::Autonomous)),
        KeyCode::Esc | KeyCode::Char('q') => Some(None),
        _ => None,
    }
}

pub(super) fn run_play(
    config: SessionConfig,
    mode: Option<Mode>,
    store: HighScoreStore,
) -> Result<(), String> {
    let high_score = store.load_high_score();
    let frame = Duration::from_millis(config.frame_ms.max(1));
    let mut session = Session::new(config).map_err(|e| e.to_string())?;

    enable_raw_mode().map_err(|e| e.to_string())?;
    let mut stdout = io::stdout();
    if let Err(err) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(err.to_string());
    }
    let mut terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(terminal) => terminal,
        Err(err) => {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            let _ = disable_raw_mode();
            return Err(err.to_string());
        }
    };

    let res = run_app(&mut terminal, &mut session, mode, high_score, frame);
    let restored = restore_terminal(&mut terminal);

    res.map_err(|e| e.to_string())?;
    restored.map_err(|e| e.to_string())?;
    if session.phase() == Phase::Menu {
        // Left from the menu; nothing was played.
        return Ok(());
    }
    finish_session(&session, &store, high_score, false)
}

/// Runs every restore step, then reports the first failure.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    let raw = disable_raw_mode();
    let screen = execute!(terminal.backend_mut(), LeaveAlternateScreen);
    let cursor = terminal.show_cursor();
    first_failure([raw, screen, cursor])
}

fn first_failure(steps: impl IntoIterator<Item = io::Result<()>>) -> io::Result<()> {
    steps.into_iter().find(Result::is_err).unwrap_or(Ok(()))
}

/// Deaths keep the final frame up until a key press; a quit leaves at once.
fn holds_final_frame(phase: Phase) -> bool {
    matches!(
        phase,
        Phase::Terminated(EndReason::Collision) | Phase::Terminated(EndReason::GridFull)
    )
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    session: &mut Session,
    mode: Option<Mode>,
    high_score: u32,
    frame: Duration,
) -> io::Result<()> {
    let mode = match mode {
        Some(mode) => mode,
        None => match pick_mode(terminal)? {
            Some(mode) => mode,
            None => return Ok(()),
        },
    };

    let clock = Instant::now();
    let now_ms = || clock.elapsed().as_millis() as u64;
    session.start(mode, now_ms());

    let mut last_frame = Instant::now();
    loop {
        if let Some(tick) = session.update(now_ms()) {
            debug!(tick = tick.tick, outcome = ?tick.outcome, "frame advanced snake");
        }

        let view = session.view(high_score.max(session.score()));
        terminal.draw(|f| draw_frame(f, &view))?;
        if session.is_over() {
            if holds_final_frame(session.phase()) {
                wait_for_key()?;
            }
            return Ok(());
        }

        let timeout = frame
            .checked_sub(last_frame.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let event::Event::Key(key) = event::read()? {
                handle_key(session, key);
            }
        }
        if last_frame.elapsed() >= frame {
            last_frame = Instant::now();
        }
    }
}

fn handle_key(session: &mut Session, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key_action(key.code) {
        Some(KeyAction::Quit) => session.quit(),
        Some(KeyAction::Steer(direction)) => {
            if !session.queue_move(direction) {
                debug!(%direction, "input ignored");
            }
        }
        None => {}
    }
}

fn wait_for_key() -> io::Result<()> {
    loop {
        if let event::Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(());
            }
        }
    }
}

fn pick_mode<B: Backend>(terminal: &mut Terminal<B>) -> io::Result<Option<Mode>> {
    loop {
        terminal.draw(draw_menu)?;
        if let event::Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(choice) = menu_choice(key.code) {
                return Ok(choice);
            }
        }
    }
}

fn draw_menu(f: &mut Frame) {
    let text = vec![
        Line::from(Span::styled(
            "OUROBOROS",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("1 - Human | 2 - AI"),
        Line::from(""),
        Line::from("W/A/S/D or arrows to steer, Esc or q to quit"),
    ];
    f.render_widget(Paragraph::new(text), f.area());
}

fn draw_frame(f: &mut Frame, view: &FrameView) {
    let chunks = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(f.area());

    let (hud, hud_style) = if view.over {
        (
            format!("{} (press any key)", view.hud()),
            Style::default().fg(Color::Red).add_modifier(Modifier::REVERSED),
        )
    } else {
        (view.hud(), Style::default().add_modifier(Modifier::REVERSED))
    };
    f.render_widget(Paragraph::new(Span::styled(hud, hud_style)), chunks[0]);

    let text: Vec<Line> = view
        .rows()
        .into_iter()
        .map(|row| Line::from(Span::raw(row)))
        .collect();
    f.render_widget(
        Paragraph::new(text).style(Style::default().fg(Color::White).bg(Color::Black)),
        chunks[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use ouroboros::Strategy;
    use ratatui::backend::TestBackend;

    fn human_session() -> Session {
        let config = SessionConfig {
            width: 10,
            height: 6,
            seed: Some(5),
            mode: Mode::Human,
            strategy: Strategy::Smarter,
            ..SessionConfig::default()
        };
        let mut session = Session::new(config).unwrap();
        session.start(Mode::Human, 0);
        session
    }

    #[test]
    fn wasd_and_arrows_steer() {
        assert_eq!(
            key_action(KeyCode::Char('w')),
            Some(KeyAction::Steer(Direction::Up))
        );
        assert_eq!(
            key_action(KeyCode::Left),
            Some(KeyAction::Steer(Direction::Left))
        );
        assert_eq!(
            key_action(KeyCode::Char('S')),
            Some(KeyAction::Steer(Direction::Down))
        );
        assert_eq!(key_action(KeyCode::Esc), Some(KeyAction::Quit));
        assert_eq!(key_action(KeyCode::Char('x')), None);
    }

    #[test]
    fn menu_keys_pick_a_mode() {
        assert_eq!(menu_choice(KeyCode::Char('1')), Some(Some(Mode::Human)));
        assert_eq!(
            menu_choice(KeyCode::Char('2')),
            Some(Some(Mode::Autonomous))
        );
        assert_eq!(menu_choice(KeyCode::Esc), Some(None));
        assert_eq!(menu_choice(KeyCode::Char('3')), None);
    }

    #[test]
    fn key_presses_reach_the_session() {
        let mut session = human_session();
        handle_key(
            &mut session,
            KeyEvent::new(KeyCode::Char('w'), KeyModifiers::NONE),
        );
        assert_eq!(session.snake().pending_moves().len(), 1);

        handle_key(&mut session, KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert!(session.is_over());
    }

    #[test]
    fn frame_draws_hud_and_grid() {
        let session = human_session();
        let view = session.view(9);
        let mut terminal = Terminal::new(TestBackend::new(20, 8)).unwrap();
        terminal.draw(|f| draw_frame(f, &view)).unwrap();

        let buffer = terminal.backend().buffer();
        let hud: String = (0..6).map(|x| buffer[(x, 0)].symbol().to_string()).collect();
        assert_eq!(hud, "Score:");

        let head = session.snake().head();
        let glyph = buffer[(head.x as u16, head.y as u16 + 1)].symbol().to_string();
        assert_eq!(glyph, "@");
    }

    #[test]
    fn restore_reports_the_first_failure_after_every_step() {
        let steps = [
            Ok(()),
            Err(io::Error::new(io::ErrorKind::Other, "leave screen")),
            Err(io::Error::new(io::ErrorKind::Interrupted, "show cursor")),
        ];
        let err = first_failure(steps).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(first_failure([Ok(()), Ok(()), Ok(())]).is_ok());
    }

    #[test]
    fn deaths_hold_the_final_frame_but_quitting_does_not() {
        assert!(holds_final_frame(Phase::Terminated(EndReason::Collision)));
        assert!(holds_final_frame(Phase::Terminated(EndReason::GridFull)));
        assert!(!holds_final_frame(Phase::Terminated(EndReason::Quit)));
        assert!(!holds_final_frame(Phase::Running));
    }

    #[test]
    fn game_over_frame_asks_for_a_key() {
        let session = human_session();
        let mut view = session.view(0);
        view.over = true;
        let mut terminal = Terminal::new(TestBackend::new(80, 8)).unwrap();
        terminal.draw(|f| draw_frame(f, &view)).unwrap();

        let buffer = terminal.backend().buffer();
        let hud: String = (0..80).map(|x| buffer[(x, 0)].symbol().to_string()).collect();
        assert!(hud.contains("GAME OVER (press any key)"));
    }
}
