use std::{
    collections::HashMap,
    error::Error,
    time::{Duration, Instant},
};

use re_lab::core::{
    crackme::{self, Crackme, Verdict},
    error::LabError,
    input::parse_hex,
    solve::{self, SearchSpace},
};

use crate::tui::utils::{self, cursor};

use ratatui::{
    DefaultTerminal,
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    widgets::{ListState, ScrollbarState},
};

#[derive(Clone, Debug, PartialEq)]
pub enum CurrentScreen {
    ChallengeList,
    Attempt,
    Exiting,
}

#[derive(Clone, PartialEq, Debug)]
pub enum SelectedInput {
    ChallengeFilter,
    Candidate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptWidget {
    CandidateInput,
    Attempts,
    AppMessage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChallengeListWidget {
    ChallengeList,
    ChallengeFilter,
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputMode {
    Normal,
    Insert,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub enum AppMessageType {
    #[default]
    Info,
    Error,
}

#[derive(Clone, Debug, Default)]
pub struct AppMessage {
    pub msg: String,
    pub msg_type: AppMessageType,
}

impl AppMessage {
    pub fn new(msg: &str, msg_type: AppMessageType) -> Self {
        AppMessage {
            msg: msg.to_owned(),
            msg_type,
        }
    }
}

/// Work deferred to the next loop iteration so the screen can show a
/// message first.
#[derive(Clone, Debug, PartialEq)]
pub enum AppAction {
    Solve,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    NextWidget,
    PrevWidget,
    GoBack,

    ExitInsertMode,
    AcceptInput,

    InsertChar(char),
    DeleteChar,
    MoveCursorLeft,
    MoveCursorRight,

    ShowChallengeList,
    SelectChallenge,

    EditCandidate,
    ToggleHexInput,
    Solve,
    CopySolution,
    ClearAttempts,

    MoveUp,
    MoveDown,
    MoveToTop,
    MoveToBottom,

    Quit,
    ConfirmQuit,
    CancelQuit,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Direction {
    Up,
    Down,
    Top,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyPress {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyPress {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        KeyPress { code, modifiers }
    }

    pub fn from_key_event(event: KeyEvent) -> Self {
        KeyPress {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

#[derive(Clone)]
pub struct KeyBindings {
    challenge_list_normal: HashMap<KeyPress, Command>,
    attempt_normal: HashMap<KeyPress, Command>,
    exiting_screen: HashMap<KeyPress, Command>,
    insert_mode: HashMap<KeyPress, Command>,
    global: HashMap<KeyPress, Command>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut bindings = KeyBindings {
            challenge_list_normal: HashMap::new(),
            attempt_normal: HashMap::new(),
            exiting_screen: HashMap::new(),
            insert_mode: HashMap::new(),
            global: HashMap::new(),
        };

        bindings.init_default_bindings();
        bindings
    }
}

impl KeyBindings {
    fn bind(map: &mut HashMap<KeyPress, Command>, keys: &[(KeyCode, KeyModifiers)], cmd: Command) {
        for &(code, modifiers) in keys {
            map.insert(KeyPress::new(code, modifiers), cmd.clone());
        }
    }

    fn init_default_bindings(&mut self) {
        const NONE: KeyModifiers = KeyModifiers::NONE;
        const SHIFT: KeyModifiers = KeyModifiers::SHIFT;

        Self::bind(&mut self.global, &[(KeyCode::Char('q'), NONE)], Command::Quit);
        Self::bind(
            &mut self.global,
            &[(KeyCode::Char('c'), KeyModifiers::CONTROL)],
            Command::Quit,
        );

        // lists share vim style movement
        for map in [&mut self.challenge_list_normal, &mut self.attempt_normal] {
            Self::bind(
                map,
                &[(KeyCode::Char('j'), NONE), (KeyCode::Down, NONE)],
                Command::MoveDown,
            );
            Self::bind(
                map,
                &[(KeyCode::Char('k'), NONE), (KeyCode::Up, NONE)],
                Command::MoveUp,
            );
            Self::bind(map, &[(KeyCode::Char('G'), SHIFT)], Command::MoveToBottom);
            Self::bind(map, &[(KeyCode::Tab, NONE)], Command::NextWidget);
            Self::bind(map, &[(KeyCode::BackTab, SHIFT)], Command::PrevWidget);
        }

        let list = &mut self.challenge_list_normal;
        Self::bind(list, &[(KeyCode::Char('r'), NONE)], Command::ShowChallengeList);
        Self::bind(list, &[(KeyCode::Enter, NONE)], Command::SelectChallenge);

        let attempt = &mut self.attempt_normal;
        Self::bind(attempt, &[(KeyCode::Char('s'), NONE)], Command::Solve);
        Self::bind(
            attempt,
            &[(KeyCode::Char('c'), NONE), (KeyCode::Char('y'), NONE)],
            Command::CopySolution,
        );
        Self::bind(attempt, &[(KeyCode::Char('x'), NONE)], Command::ToggleHexInput);
        Self::bind(attempt, &[(KeyCode::Char('d'), NONE)], Command::ClearAttempts);
        Self::bind(
            attempt,
            &[(KeyCode::Char('i'), NONE), (KeyCode::Enter, NONE)],
            Command::EditCandidate,
        );
        Self::bind(attempt, &[(KeyCode::Esc, NONE)], Command::GoBack);

        let exiting = &mut self.exiting_screen;
        Self::bind(
            exiting,
            &[
                (KeyCode::Char('y'), NONE),
                (KeyCode::Char('q'), NONE),
                (KeyCode::Enter, NONE),
            ],
            Command::ConfirmQuit,
        );
        Self::bind(
            exiting,
            &[(KeyCode::Char('n'), NONE), (KeyCode::Esc, NONE)],
            Command::CancelQuit,
        );

        let insert = &mut self.insert_mode;
        Self::bind(insert, &[(KeyCode::Esc, NONE)], Command::ExitInsertMode);
        Self::bind(insert, &[(KeyCode::Enter, NONE)], Command::AcceptInput);
        Self::bind(insert, &[(KeyCode::Backspace, NONE)], Command::DeleteChar);
        Self::bind(insert, &[(KeyCode::Left, NONE)], Command::MoveCursorLeft);
        Self::bind(insert, &[(KeyCode::Right, NONE)], Command::MoveCursorRight);
        Self::bind(insert, &[(KeyCode::Tab, NONE)], Command::NextWidget);
        Self::bind(insert, &[(KeyCode::BackTab, SHIFT)], Command::PrevWidget);
    }

    pub fn get_command(
        &self,
        key_event: KeyEvent,
        screen: &CurrentScreen,
        input_mode: &InputMode,
    ) -> Option<Command> {
        let key_press = KeyPress::from_key_event(key_event);

        // exit popup keys overlap with the global ones
        if *screen == CurrentScreen::Exiting {
            return self.exiting_screen.get(&key_press).cloned();
        }

        match input_mode {
            InputMode::Insert => {
                if let KeyCode::Char(c) = key_event.code
                    && (key_event.modifiers == KeyModifiers::NONE
                        || key_event.modifiers == KeyModifiers::SHIFT)
                {
                    return Some(Command::InsertChar(c));
                }
                if let Some(cmd) = self.global.get(&key_press) {
                    return Some(cmd.clone());
                }
                self.insert_mode.get(&key_press).cloned()
            }
            InputMode::Normal => {
                if let Some(cmd) = self.global.get(&key_press) {
                    return Some(cmd.clone());
                }
                match screen {
                    CurrentScreen::ChallengeList => {
                        self.challenge_list_normal.get(&key_press).cloned()
                    }
                    CurrentScreen::Attempt => self.attempt_normal.get(&key_press).cloned(),
                    CurrentScreen::Exiting => None,
                }
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppState {
    pub current_screen: CurrentScreen,
    pub screen_history: Vec<CurrentScreen>,
    pub should_exit: bool,
}

impl AppState {
    pub fn new() -> Self {
        AppState {
            current_screen: CurrentScreen::ChallengeList,
            screen_history: vec![],
            should_exit: false,
        }
    }
}

#[derive(Clone, Default)]
pub struct InputBuffers {
    pub challenge_filter: String,
    pub candidate: String,
}

impl InputBuffers {
    pub fn get_mut(&mut self, input: &SelectedInput) -> &mut String {
        match input {
            SelectedInput::ChallengeFilter => &mut self.challenge_filter,
            SelectedInput::Candidate => &mut self.candidate,
        }
    }

    pub fn get(&self, input: &SelectedInput) -> &String {
        match input {
            SelectedInput::ChallengeFilter => &self.challenge_filter,
            SelectedInput::Candidate => &self.candidate,
        }
    }

    pub fn char_count(&self, input: &SelectedInput) -> usize {
        self.get(input).chars().count()
    }
}

#[derive(Clone, Default)]
pub struct ListStates {
    pub challenges: ListState,
    pub attempts: ListState,
}

#[derive(Clone, Default)]
pub struct ScrollStates {
    pub challenges_vertical: ScrollbarState,
    pub attempts_vertical: ScrollbarState,
}

#[derive(Clone)]
pub struct WidgetSelection {
    pub attempt_widgets: Vec<AttemptWidget>,
    pub attempt_selected_index: usize,
    pub challenge_list_widgets: Vec<ChallengeListWidget>,
    pub challenge_list_selected_index: usize,
}

impl WidgetSelection {
    pub fn new() -> Self {
        WidgetSelection {
            attempt_widgets: vec![
                AttemptWidget::CandidateInput,
                AttemptWidget::Attempts,
                AttemptWidget::AppMessage,
            ],
            attempt_selected_index: 0,
            challenge_list_widgets: vec![
                ChallengeListWidget::ChallengeFilter,
                ChallengeListWidget::ChallengeList,
            ],
            challenge_list_selected_index: 0,
        }
    }

    pub fn attempt_widget(&self) -> &AttemptWidget {
        &self.attempt_widgets[self.attempt_selected_index]
    }

    pub fn challenge_list_widget(&self) -> &ChallengeListWidget {
        &self.challenge_list_widgets[self.challenge_list_selected_index]
    }
}

#[derive(Clone)]
pub struct UiState {
    pub input_buffers: InputBuffers,
    pub list_states: ListStates,
    pub scroll_states: ScrollStates,
    pub selected_widgets: WidgetSelection,
    pub input_mode: InputMode,
    pub selected_input: Option<SelectedInput>,
    pub character_index: usize,
    pub last_g_press_time: Option<Instant>,
}

impl UiState {
    pub fn new() -> Self {
        UiState {
            input_buffers: InputBuffers::default(),
            list_states: ListStates::default(),
            scroll_states: ScrollStates::default(),
            selected_widgets: WidgetSelection::new(),
            input_mode: InputMode::Insert,
            selected_input: Some(SelectedInput::ChallengeFilter),
            character_index: 0,
            last_g_press_time: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attempt {
    pub candidate: Vec<u8>,
    pub verdict: Verdict,
}

impl Attempt {
    /// Text when printable, hex otherwise.
    pub fn display_candidate(&self) -> String {
        display_bytes(&self.candidate)
    }
}

pub fn display_bytes(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) if !s.chars().any(char::is_control) => format!("{s:?}"),
        _ => format!("0x{}", hex::encode(bytes)),
    }
}

pub struct App {
    pub state: AppState,
    pub ui: UiState,
    pub catalog: Vec<Box<dyn Crackme>>,
    /// Indices into `catalog` that pass the filter.
    pub visible: Vec<usize>,
    pub selected: Option<usize>,
    pub attempts: Vec<Attempt>,
    pub solution: Option<Vec<u8>>,
    pub hex_input: bool,
    pub search_space: SearchSpace,
    pub app_message: AppMessage,
    pub app_action: Option<AppAction>,
    pub key_bindings: KeyBindings,
}

impl App {
    pub fn new(search_space: SearchSpace) -> App {
        App {
            state: AppState::new(),
            ui: UiState::new(),
            catalog: crackme::all(),
            visible: vec![],
            selected: None,
            attempts: vec![],
            solution: None,
            hex_input: false,
            search_space,
            app_message: AppMessage::default(),
            app_action: None,
            key_bindings: KeyBindings::default(),
        }
    }

    pub fn selected_crackme(&self) -> Option<&dyn Crackme> {
        self.selected
            .and_then(|i| self.catalog.get(i))
            .map(|c| c.as_ref())
    }

    fn show_challenge_list(&mut self) {
        let filter = self.ui.input_buffers.challenge_filter.trim().to_lowercase();

        self.visible = self
            .catalog
            .iter()
            .enumerate()
            .filter(|(_, c)| filter.is_empty() || c.name().starts_with(&filter))
            .map(|(i, _)| i)
            .collect();

        self.ui.scroll_states.challenges_vertical = self
            .ui
            .scroll_states
            .challenges_vertical
            .content_length(self.visible.len());
        if self.visible.is_empty() {
            self.ui.list_states.challenges.select(None);
        } else {
            self.ui.list_states.challenges.select(Some(0));
        }

        self.state.current_screen = CurrentScreen::ChallengeList;
        if filter.is_empty() {
            self.insert_mode_for(SelectedInput::ChallengeFilter);
        }
    }

    fn show_attempt_view(&mut self) {
        if self.selected.is_none() {
            self.show_challenge_list();
            return;
        }

        self.attempts.clear();
        self.solution = None;
        self.hex_input = false;
        self.ui.input_buffers.candidate.clear();
        self.ui.list_states.attempts.select(None);
        self.ui.scroll_states.attempts_vertical = ScrollbarState::default();
        self.app_message = AppMessage::default();
        self.go_to(CurrentScreen::Attempt);
        self.select_widget(AttemptWidget::CandidateInput);
    }

    fn go_to(&mut self, screen: CurrentScreen) {
        self.state
            .screen_history
            .push(self.state.current_screen.clone());
        self.state.current_screen = screen;
    }

    fn go_back(&mut self) {
        let last_screen = self.state.screen_history.pop();

        self.ui.input_mode = InputMode::Normal;
        match last_screen {
            None | Some(CurrentScreen::ChallengeList) => {
                self.selected = None;
                self.app_message = AppMessage::default();
                self.ui.selected_widgets.challenge_list_selected_index = 0;
                self.show_challenge_list();
                self.enable_challenge_list_auto_input();
            }
            Some(screen) => {
                self.state.current_screen = screen;
            }
        }
    }

    fn enable_auto_input(&mut self) {
        match self.ui.selected_widgets.attempt_widget() {
            AttemptWidget::CandidateInput => self.insert_mode_for(SelectedInput::Candidate),
            _ => self.ui.input_mode = InputMode::Normal,
        }
    }

    fn enable_challenge_list_auto_input(&mut self) {
        match self.ui.selected_widgets.challenge_list_widget() {
            ChallengeListWidget::ChallengeFilter => {
                self.insert_mode_for(SelectedInput::ChallengeFilter)
            }
            ChallengeListWidget::ChallengeList => self.ui.input_mode = InputMode::Normal,
        }
    }

    pub fn select_widget(&mut self, widget: AttemptWidget) {
        if let Some(index) = self
            .ui
            .selected_widgets
            .attempt_widgets
            .iter()
            .position(|x| *x == widget)
        {
            self.ui.selected_widgets.attempt_selected_index = index;
        }

        if widget == AttemptWidget::Attempts
            && !self.attempts.is_empty()
            && self.ui.list_states.attempts.selected().is_none()
        {
            self.ui.list_states.attempts.select(Some(0));
        }

        self.enable_auto_input();
    }

    pub fn insert_mode_for(&mut self, selected_input: SelectedInput) {
        cursor::reset_cursor(self);
        self.ui.input_mode = InputMode::Insert;
        self.ui.character_index = self.ui.input_buffers.char_count(&selected_input);
        self.ui.selected_input = Some(selected_input);
    }

    fn cycle_widget(&mut self, forward: bool) {
        let step = |index: usize, len: usize| {
            if forward {
                (index + 1) % len
            } else {
                (index + len - 1) % len
            }
        };

        match self.state.current_screen {
            CurrentScreen::Attempt => {
                let sel = &mut self.ui.selected_widgets;
                sel.attempt_selected_index =
                    step(sel.attempt_selected_index, sel.attempt_widgets.len());
                let widget = sel.attempt_widget().clone();
                self.select_widget(widget);
            }
            CurrentScreen::ChallengeList => {
                let sel = &mut self.ui.selected_widgets;
                sel.challenge_list_selected_index = step(
                    sel.challenge_list_selected_index,
                    sel.challenge_list_widgets.len(),
                );
                self.enable_challenge_list_auto_input();
            }
            CurrentScreen::Exiting => {}
        }
    }

    fn select_challenge(&mut self) {
        let Some(position) = self.ui.list_states.challenges.selected() else {
            return;
        };

        match self.visible.get(position) {
            None => self.show_challenge_list(),
            Some(&index) => {
                self.selected = Some(index);
                self.show_attempt_view();
            }
        }
    }

    fn parse_candidate(&self) -> Result<Vec<u8>, LabError> {
        let input = &self.ui.input_buffers.candidate;
        if self.hex_input {
            parse_hex(input)
        } else {
            Ok(input.as_bytes().to_vec())
        }
    }

    fn submit_attempt(&mut self) {
        let candidate = match self.parse_candidate() {
            Ok(candidate) => candidate,
            Err(e) => {
                self.app_message = AppMessage::new(&format!("{e}"), AppMessageType::Error);
                return;
            }
        };

        let Some(crackme) = self.selected_crackme() else {
            return;
        };
        let verdict = crackme.verdict(&candidate);

        self.app_message = AppMessage::new(
            &format!("{} -> {}", display_bytes(&candidate), verdict),
            if verdict.accepted {
                AppMessageType::Info
            } else {
                AppMessageType::Error
            },
        );
        self.attempts.insert(0, Attempt { candidate, verdict });
        self.ui.scroll_states.attempts_vertical = self
            .ui
            .scroll_states
            .attempts_vertical
            .content_length(self.attempts.len())
            .position(0);
        self.ui.list_states.attempts.select(Some(0));
    }

    /// Shown while the search runs; the event loop is blocked until then.
    fn solve_message(&self) -> String {
        if self.selected_crackme().is_some_and(|c| c.name() == "obf") {
            return "Solving: inverting the transform...".to_string();
        }
        let max_len = self.search_space.max_len;
        match self.search_space.total() {
            Some(total) => format!(
                "Solving: {total} candidates up to {max_len} bytes (keys wait until done)..."
            ),
            None => format!("Solving: uncountable space up to {max_len} bytes (keys wait)..."),
        }
    }

    fn solve(&mut self) {
        let Some(crackme) = self.selected_crackme() else {
            return;
        };

        match solve::solve(crackme, &self.search_space) {
            Some(found) => {
                self.app_message = AppMessage::new(
                    &format!("Solution: {} (c: copy)", display_bytes(&found)),
                    AppMessageType::Info,
                );
                self.hex_input = std::str::from_utf8(&found).is_err();
                self.ui.input_buffers.candidate = if self.hex_input {
                    hex::encode(&found)
                } else {
                    String::from_utf8_lossy(&found).into_owned()
                };
                self.solution = Some(found);
            }
            None => {
                self.app_message = AppMessage::new(
                    &format!(
                        "No solution up to {} bytes over {} symbols",
                        self.search_space.max_len,
                        self.search_space.charset.len()
                    ),
                    AppMessageType::Error,
                );
            }
        }
    }

    fn copy_solution(&mut self) -> Result<(), LabError> {
        let text = match &self.solution {
            // non UTF-8 secrets can only be pasted as hex
            Some(found) => match std::str::from_utf8(found) {
                Ok(s) => s.to_owned(),
                Err(_) => hex::encode(found),
            },
            None => {
                self.app_message =
                    AppMessage::new("Nothing solved yet (s: solve)", AppMessageType::Info);
                return Ok(());
            }
        };

        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text)?;
        self.app_message =
            AppMessage::new("Solution copied to clipboard", AppMessageType::Info);
        Ok(())
    }

    fn handle_normal_mode_event(&mut self, key: KeyEvent) {
        // 'g' twice within half a second jumps to the top
        if key.code == KeyCode::Char('g') && key.modifiers == KeyModifiers::NONE {
            if let Some(t) = self.ui.last_g_press_time
                && t.elapsed() < Duration::from_millis(500)
            {
                self.ui.last_g_press_time = None;
                self.handle_command(Command::MoveToTop);
                return;
            }
            self.ui.last_g_press_time = Some(Instant::now());
            return;
        }

        if let Some(cmd) =
            self.key_bindings
                .get_command(key, &self.state.current_screen, &InputMode::Normal)
        {
            self.handle_command(cmd);
        }
    }

    fn accept_input(&mut self) {
        match self.ui.selected_input {
            Some(SelectedInput::ChallengeFilter) => {
                self.show_challenge_list();
                self.ui.selected_widgets.challenge_list_selected_index = 1;
                self.ui.input_mode = InputMode::Normal;
            }
            Some(SelectedInput::Candidate) => self.submit_attempt(),
            None => {}
        }
    }

    pub fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::NextWidget => self.cycle_widget(true),
            Command::PrevWidget => self.cycle_widget(false),
            Command::GoBack => self.go_back(),

            Command::ExitInsertMode => {
                if self.state.current_screen == CurrentScreen::Attempt {
                    self.ui.input_mode = InputMode::Normal;
                } else {
                    self.ui.selected_widgets.challenge_list_selected_index = 1;
                    self.ui.input_mode = InputMode::Normal;
                }
            }
            Command::AcceptInput => self.accept_input(),

            Command::InsertChar(c) => {
                if let Some(input) = self.ui.selected_input.clone() {
                    let buffer = self.ui.input_buffers.get_mut(&input);
                    cursor::enter_char(buffer, &mut self.ui.character_index, c);
                    if input == SelectedInput::ChallengeFilter {
                        self.show_challenge_list();
                    }
                }
            }
            Command::DeleteChar => {
                if let Some(input) = self.ui.selected_input.clone() {
                    let buffer = self.ui.input_buffers.get_mut(&input);
                    cursor::delete_char(buffer, &mut self.ui.character_index);
                    if input == SelectedInput::ChallengeFilter {
                        self.show_challenge_list();
                    }
                }
            }
            Command::MoveCursorLeft => {
                if let Some(input) = &self.ui.selected_input {
                    let buffer = self.ui.input_buffers.get(input);
                    cursor::move_cursor_left(buffer, &mut self.ui.character_index);
                }
            }
            Command::MoveCursorRight => {
                if let Some(input) = &self.ui.selected_input {
                    let buffer = self.ui.input_buffers.get(input);
                    cursor::move_cursor_right(buffer, &mut self.ui.character_index);
                }
            }

            Command::ShowChallengeList => self.show_challenge_list(),
            Command::SelectChallenge => self.select_challenge(),

            Command::EditCandidate => self.select_widget(AttemptWidget::CandidateInput),
            Command::ToggleHexInput => {
                self.hex_input = !self.hex_input;
                let mode = if self.hex_input { "hex" } else { "text" };
                self.app_message =
                    AppMessage::new(&format!("Input mode: {mode}"), AppMessageType::Info);
            }
            Command::Solve => {
                self.app_message = AppMessage::new(&self.solve_message(), AppMessageType::Info);
                self.app_action = Some(AppAction::Solve);
            }
            Command::CopySolution => {
                if let Err(e) = self.copy_solution() {
                    self.app_message = AppMessage::new(&format!("{e}"), AppMessageType::Error);
                }
            }
            Command::ClearAttempts => {
                self.attempts.clear();
                self.ui.list_states.attempts.select(None);
                self.ui.scroll_states.attempts_vertical = ScrollbarState::default();
            }

            Command::MoveUp => self.handle_navigate(Direction::Up),
            Command::MoveDown => self.handle_navigate(Direction::Down),
            Command::MoveToTop => self.handle_navigate(Direction::Top),
            Command::MoveToBottom => self.handle_navigate(Direction::Bottom),

            Command::Quit => {
                if self.state.current_screen != CurrentScreen::Exiting {
                    self.go_to(CurrentScreen::Exiting);
                }
            }
            Command::ConfirmQuit => self.state.should_exit = true,
            Command::CancelQuit => {
                if let Some(screen) = self.state.screen_history.pop() {
                    self.state.current_screen = screen;
                }
            }
        }
    }

    fn handle_navigate(&mut self, dir: Direction) {
        match self.state.current_screen {
            CurrentScreen::ChallengeList => {
                if *self.ui.selected_widgets.challenge_list_widget()
                    == ChallengeListWidget::ChallengeList
                {
                    utils::handle_list_navigation(
                        dir,
                        &mut self.ui.list_states.challenges,
                        self.visible.len(),
                        Some(&mut self.ui.scroll_states.challenges_vertical),
                        &mut self.ui.last_g_press_time,
                    );
                }
            }
            CurrentScreen::Attempt => {
                if *self.ui.selected_widgets.attempt_widget() == AttemptWidget::Attempts {
                    utils::handle_list_navigation(
                        dir,
                        &mut self.ui.list_states.attempts,
                        self.attempts.len(),
                        Some(&mut self.ui.scroll_states.attempts_vertical),
                        &mut self.ui.last_g_press_time,
                    );
                }
            }
            CurrentScreen::Exiting => {}
        }
    }

    fn handle_insert_mode_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if let Some(cmd) =
            self.key_bindings
                .get_command(key, &self.state.current_screen, &InputMode::Insert)
        {
            self.handle_command(cmd);
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<(), Box<dyn Error>> {
        let tick_rate = Duration::from_millis(250);
        let mut last_tick = Instant::now();
        self.show_challenge_list();
        loop {
            if self.state.should_exit {
                return Ok(());
            }

            terminal.draw(|f| super::ui::draw_ui(f, self))?;

            if let Some(app_action) = self.app_action.take() {
                match app_action {
                    AppAction::Solve => self.solve(),
                }
                continue;
            }

            let timeout = tick_rate.saturating_sub(last_tick.elapsed());
            if event::poll(timeout)?
                && let Event::Key(key) = event::read()?
            {
                if key.kind == KeyEventKind::Release {
                    continue;
                }

                match self.ui.input_mode {
                    InputMode::Normal => self.handle_normal_mode_event(key),
                    InputMode::Insert => self.handle_insert_mode_event(key),
                }
            }

            if last_tick.elapsed() >= tick_rate {
                last_tick = Instant::now();
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_command(Command::InsertChar(c));
        }
    }

    fn open(app: &mut App, name: &str) {
        app.show_challenge_list();
        type_str(app, name);
        app.handle_command(Command::AcceptInput);
        app.handle_command(Command::SelectChallenge);
    }

    #[test]
    fn test_key_bindings_by_mode() {
        let bindings = KeyBindings::default();
        let normal = |code, screen| bindings.get_command(key(code), &screen, &InputMode::Normal);

        assert_eq!(normal(KeyCode::Char('q'), CurrentScreen::Attempt), Some(Command::Quit));
        assert_eq!(normal(KeyCode::Char('s'), CurrentScreen::Attempt), Some(Command::Solve));
        assert_eq!(
            normal(KeyCode::Enter, CurrentScreen::ChallengeList),
            Some(Command::SelectChallenge)
        );
        assert_eq!(
            normal(KeyCode::Char('n'), CurrentScreen::Exiting),
            Some(Command::CancelQuit)
        );
        assert_eq!(
            bindings.get_command(
                key(KeyCode::Char('q')),
                &CurrentScreen::Attempt,
                &InputMode::Insert
            ),
            Some(Command::InsertChar('q'))
        );
        assert_eq!(
            bindings.get_command(
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
                &CurrentScreen::Attempt,
                &InputMode::Insert
            ),
            Some(Command::Quit)
        );
    }

    #[test]
    fn test_filter_narrows_challenges() {
        let mut app = App::new(SearchSpace::default());
        app.show_challenge_list();
        assert_eq!(app.visible.len(), 3);
        assert_eq!(app.ui.input_mode, InputMode::Insert);

        type_str(&mut app, "cr");
        assert_eq!(app.visible.len(), 1);
        assert_eq!(app.catalog[app.visible[0]].name(), "crackme1");

        type_str(&mut app, "z");
        assert!(app.visible.is_empty());
        assert_eq!(app.ui.list_states.challenges.selected(), None);
    }

    #[test]
    fn test_text_attempt_is_recorded() {
        let mut app = App::new(SearchSpace::default());
        open(&mut app, "obf");
        assert_eq!(app.state.current_screen, CurrentScreen::Attempt);
        assert_eq!(app.selected_crackme().unwrap().name(), "obf");
        assert_eq!(app.ui.selected_input, Some(SelectedInput::Candidate));

        type_str(&mut app, "CR{f1ag}");
        app.handle_command(Command::AcceptInput);
        assert_eq!(app.attempts.len(), 1);
        assert!(!app.attempts[0].verdict.accepted);
        assert_eq!(app.app_message.msg_type, AppMessageType::Error);
    }

    #[test]
    fn test_hex_attempt_accepts_secret() {
        let mut app = App::new(SearchSpace::default());
        open(&mut app, "obf");

        app.handle_command(Command::ToggleHexInput);
        type_str(&mut app, "84 8a 82 88 9e e6 e9 ed");
        app.handle_command(Command::AcceptInput);
        assert!(app.attempts[0].verdict.accepted);
        assert_eq!(app.attempts[0].display_candidate(), "0x848a82889ee6e9ed");

        app.ui.input_buffers.candidate = "zz".to_string();
        app.handle_command(Command::AcceptInput);
        assert_eq!(app.attempts.len(), 1);
        assert_eq!(app.app_message.msg_type, AppMessageType::Error);
    }

    #[test]
    fn test_solve_message_shows_space_size() {
        let mut app = App::new(SearchSpace::default());
        open(&mut app, "crackme1");
        app.handle_command(Command::Solve);
        assert!(app.app_message.msg.contains("82317121 candidates up to 4 bytes"));

        let mut app = App::new(SearchSpace {
            max_len: 64,
            ..SearchSpace::default()
        });
        open(&mut app, "guess");
        app.handle_command(Command::Solve);
        assert!(app.app_message.msg.contains("uncountable"));
        assert_eq!(app.app_action, Some(AppAction::Solve));
    }

    #[test]
    fn test_hex_attempt_with_prefixed_tokens() {
        let mut app = App::new(SearchSpace::default());
        open(&mut app, "obf");
        app.handle_command(Command::ToggleHexInput);
        type_str(&mut app, "0x84 0x8a 0x82 0x88 0x9e 0xe6 0xe9 0xed");
        app.handle_command(Command::AcceptInput);
        assert!(app.attempts[0].verdict.accepted);
    }

    #[test]
    fn test_solve_fills_candidate() {
        let mut app = App::new(SearchSpace::default());
        open(&mut app, "obf");

        app.handle_command(Command::Solve);
        assert_eq!(app.app_action, Some(AppAction::Solve));
        app.app_action = None;
        app.solve();

        let secret = [0x84, 0x8a, 0x82, 0x88, 0x9e, 0xe6, 0xe9, 0xed];
        assert_eq!(app.solution.as_deref(), Some(&secret[..]));
        assert!(app.hex_input);
        assert_eq!(app.ui.input_buffers.candidate, "848a82889ee6e9ed");

        app.handle_command(Command::AcceptInput);
        assert!(app.attempts[0].verdict.accepted);
    }

    #[test]
    fn test_quit_flow() {
        let mut app = App::new(SearchSpace::default());
        open(&mut app, "guess");

        app.handle_command(Command::Quit);
        assert_eq!(app.state.current_screen, CurrentScreen::Exiting);
        app.handle_command(Command::CancelQuit);
        assert_eq!(app.state.current_screen, CurrentScreen::Attempt);

        app.handle_command(Command::Quit);
        app.handle_command(Command::ConfirmQuit);
        assert!(app.state.should_exit);
    }

    #[test]
    fn test_go_back_returns_to_list() {
        let mut app = App::new(SearchSpace::default());
        open(&mut app, "guess");

        app.handle_command(Command::GoBack);
        assert_eq!(app.state.current_screen, CurrentScreen::ChallengeList);
        assert!(app.selected.is_none());
    }

    #[test]
    fn test_display_bytes() {
        assert_eq!(display_bytes(b"abc"), "\"abc\"");
        assert_eq!(display_bytes(b"a\nb"), "0x610a62");
        assert_eq!(display_bytes(&[0xff]), "0xff");
    }
}
