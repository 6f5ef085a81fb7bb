//! Session state store.
//!
//! A single writable projection of what the server has declared. Every setter
//! replaces one or more fields synchronously and then notifies subscribers of
//! the slices it touched. Execution is single-threaded and run-to-completion,
//! so readers never observe a half-applied update.

use std::collections::HashMap;

use crate::model::{DrawingWord, McqQuestion, Message, RoomRef, RoundContent, Snapshot, User};

/// A slice of [`GameState`] that subscribers can watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slice {
    Connection,
    Identity,
    Room,
    Roster,
    Chat,
    Round,
    Content,
    Drawing,
    Timer,
    Scores,
}

/// Handle returned by [`SessionStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Everything the client knows about the current session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameState {
    pub is_connected: bool,
    pub user: Option<User>,
    pub room: Option<RoomRef>,
    pub users: Vec<User>,
    pub messages: Vec<Message>,
    pub content: RoundContent,
    pub drawing_data: Option<Snapshot>,
    pub time_left: u32,
    pub current_round: u32,
    pub total_rounds: u32,
    pub is_game_started: bool,
    pub scores: HashMap<String, i64>,
}

impl GameState {
    /// Whether the local identity is the active drawer. The roster entry
    /// wins over the flag on the identity itself.
    pub fn is_drawer(&self) -> bool {
        let Some(me) = &self.user else {
            return false;
        };
        self.users
            .iter()
            .find(|u| u.id == me.id)
            .map_or(me.is_drawer(), User::is_drawer)
    }
}

type Listener = Box<dyn FnMut(&GameState)>;

struct Subscriber {
    id: SubscriptionId,
    slice: Slice,
    listener: Listener,
}

/// Observable container for [`GameState`].
#[derive(Default)]
pub struct SessionStore {
    state: GameState,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.state)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the full state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    // --- Subscriptions ---

    /// Call `listener` after every change to `slice`.
    pub fn subscribe<F>(&mut self, slice: Slice, listener: F) -> SubscriptionId
    where
        F: FnMut(&GameState) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push(Subscriber {
            id,
            slice,
            listener: Box::new(listener),
        });
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, slices: &[Slice]) {
        let state = &self.state;
        for sub in self.subscribers.iter_mut() {
            if slices.contains(&sub.slice) {
                (sub.listener)(state);
            }
        }
    }

    // --- Setters ---

    pub fn set_connected(&mut self, connected: bool) {
        self.state.is_connected = connected;
        self.notify(&[Slice::Connection]);
    }

    pub fn set_user(&mut self, user: User) {
        self.state.user = Some(user);
        self.notify(&[Slice::Identity]);
    }

    pub fn set_room(&mut self, room: Option<RoomRef>) {
        self.state.room = room;
        self.notify(&[Slice::Room]);
    }

    /// Replace the roster wholesale.
    pub fn set_users(&mut self, users: Vec<User>) {
        self.state.users = users;
        self.notify(&[Slice::Roster]);
    }

    /// Append a message. Order of arrival is kept as-is.
    pub fn add_message(&mut self, message: Message) {
        self.state.messages.push(message);
        self.notify(&[Slice::Chat]);
    }

    pub fn set_game_started(&mut self, started: bool) {
        self.state.is_game_started = started;
        self.notify(&[Slice::Round]);
    }

    /// Set round counters and mark the game started.
    pub fn start_round(&mut self, current_round: u32, total_rounds: u32) {
        self.state.current_round = current_round;
        self.state.total_rounds = total_rounds;
        self.state.is_game_started = true;
        self.notify(&[Slice::Round]);
    }

    pub fn set_current_round(&mut self, round: u32) {
        self.state.current_round = round;
        self.notify(&[Slice::Round]);
    }

    /// Show a new question; any previous selection is dropped.
    pub fn set_question(&mut self, question: McqQuestion) {
        self.state.content = RoundContent::Question {
            question,
            selected: None,
        };
        self.notify(&[Slice::Content]);
    }

    /// Record the local answer.
    ///
    /// Returns false without changing anything when there is no active
    /// question or an option is already selected.
    pub fn select_option(&mut self, option_id: &str) -> bool {
        match &mut self.state.content {
            RoundContent::Question { selected, .. } if selected.is_none() => {
                *selected = Some(option_id.to_string());
            }
            _ => return false,
        }
        self.notify(&[Slice::Content]);
        true
    }

    pub fn set_word(&mut self, word: DrawingWord) {
        self.state.content = RoundContent::Word(word);
        self.notify(&[Slice::Content]);
    }

    pub fn set_drawing_data(&mut self, snapshot: Snapshot) {
        self.state.drawing_data = Some(snapshot);
        self.notify(&[Slice::Drawing]);
    }

    pub fn set_time_left(&mut self, seconds: u32) {
        self.state.time_left = seconds;
        self.notify(&[Slice::Timer]);
    }

    /// Upsert one score. The roster entry, if present, mirrors it.
    pub fn update_score(&mut self, user_id: &str, score: i64) {
        self.state.scores.insert(user_id.to_string(), score);
        let mut roster_changed = false;
        for user in self.state.users.iter_mut().filter(|u| u.id == user_id) {
            user.score = score;
            roster_changed = true;
        }
        if roster_changed {
            self.notify(&[Slice::Scores, Slice::Roster]);
        } else {
            self.notify(&[Slice::Scores]);
        }
    }

    /// Restore round, chat and score fields to their initial values.
    ///
    /// Connectivity and identity are preserved.
    pub fn reset_game(&mut self) {
        let GameState {
            is_connected,
            user,
            room,
            ..
        } = std::mem::take(&mut self.state);
        self.state.is_connected = is_connected;
        self.state.user = user;
        self.state.room = room;
        self.notify(&[
            Slice::Roster,
            Slice::Chat,
            Slice::Round,
            Slice::Content,
            Slice::Drawing,
            Slice::Timer,
            Slice::Scores,
        ]);
    }

    // --- Derived reads ---

    pub fn current_question(&self) -> Option<&McqQuestion> {
        match &self.state.content {
            RoundContent::Question { question, .. } => Some(question),
            _ => None,
        }
    }

    pub fn selected_option(&self) -> Option<&str> {
        match &self.state.content {
            RoundContent::Question { selected, .. } => selected.as_deref(),
            _ => None,
        }
    }

    pub fn current_word(&self) -> Option<&DrawingWord> {
        match &self.state.content {
            RoundContent::Word(word) => Some(word),
            _ => None,
        }
    }

    /// Score from the score table; unknown ids count as zero.
    pub fn score_of(&self, user_id: &str) -> i64 {
        self.state.scores.get(user_id).copied().unwrap_or(0)
    }

    /// Roster ordered by score, highest first. Ties keep roster order.
    pub fn leaderboard(&self) -> Vec<(&User, i64)> {
        let mut board: Vec<_> = self
            .state
            .users
            .iter()
            .map(|u| (u, self.score_of(&u.id)))
            .collect();
        board.sort_by(|a, b| b.1.cmp(&a.1));
        board
    }

    /// Whether the local identity is the active drawer.
    pub fn is_drawer(&self) -> bool {
        self.state.is_drawer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, GameMode, McqOption};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn user(id: &str, name: &str) -> User {
        User {
            id: id.to_string(),
            name: name.to_string(),
            score: 0,
            avatar: None,
            is_drawing: None,
        }
    }

    fn message(id: &str, text: &str) -> Message {
        Message {
            id: id.to_string(),
            user_id: "u1".to_string(),
            user_name: "Ann".to_string(),
            text: text.to_string(),
            timestamp: 0,
            is_correct_guess: None,
        }
    }

    fn question() -> McqQuestion {
        McqQuestion {
            id: "q1".to_string(),
            question: "2 + 2?".to_string(),
            options: vec![
                McqOption { id: "a".into(), text: "3".into(), is_correct: false },
                McqOption { id: "b".into(), text: "4".into(), is_correct: true },
            ],
            explanation: None,
            category: "Math".to_string(),
            difficulty: Difficulty::Easy,
        }
    }

    #[test]
    fn test_roster_is_last_write_wins() {
        let mut store = SessionStore::new();
        store.set_users(vec![user("a", "A"), user("b", "B")]);
        store.set_users(vec![user("c", "C")]);
        assert_eq!(store.state().users, vec![user("c", "C")]);

        store.set_users(Vec::new());
        assert!(store.state().users.is_empty());
    }

    #[test]
    fn test_messages_append_in_order() {
        let mut store = SessionStore::new();
        let a = message("1", "hi");
        let b = message("2", "hello");
        let m = message("3", "hi");
        store.add_message(a.clone());
        store.add_message(b.clone());
        store.add_message(m.clone());
        assert_eq!(store.state().messages, vec![a, b, m]);

        // Duplicates are kept.
        store.add_message(message("3", "hi"));
        assert_eq!(store.state().messages.len(), 4);
    }

    #[test]
    fn test_reset_game_keeps_identity_and_connection() {
        let mut store = SessionStore::new();
        let me = user("me", "Me");
        store.set_connected(true);
        store.set_user(me.clone());
        store.set_users(vec![me.clone(), user("b", "B")]);
        store.add_message(message("1", "hi"));
        store.start_round(2, 5);
        store.set_question(question());
        store.select_option("a");
        store.set_drawing_data(Snapshot::from_data_url("data:image/png;base64,AA=="));
        store.set_time_left(42);
        store.update_score("b", 10);

        store.reset_game();

        let initial = GameState::default();
        let state = store.state();
        assert_eq!(state.users, initial.users);
        assert_eq!(state.messages, initial.messages);
        assert_eq!(state.content, initial.content);
        assert_eq!(state.drawing_data, initial.drawing_data);
        assert_eq!(state.time_left, 0);
        assert_eq!(state.current_round, 0);
        assert_eq!(state.total_rounds, 0);
        assert!(!state.is_game_started);
        assert!(state.scores.is_empty());

        assert!(state.is_connected);
        assert_eq!(state.user, Some(me));
    }

    #[test]
    fn test_single_selection() {
        let mut store = SessionStore::new();
        assert!(!store.select_option("a"));

        store.set_question(question());
        assert!(store.select_option("a"));
        assert!(!store.select_option("b"));
        assert_eq!(store.selected_option(), Some("a"));

        // A new question clears the selection.
        store.set_question(question());
        assert_eq!(store.selected_option(), None);
    }

    #[test]
    fn test_question_and_word_are_exclusive() {
        let mut store = SessionStore::new();
        store.set_question(question());
        assert!(store.current_question().is_some());

        store.set_word(DrawingWord {
            id: "w1".to_string(),
            word: "Neuron".to_string(),
            category: "Nervous System".to_string(),
            difficulty: Difficulty::Medium,
        });
        assert!(store.current_question().is_none());
        assert_eq!(store.current_word().map(|w| w.word.as_str()), Some("Neuron"));
    }

    #[test]
    fn test_score_upsert_mirrors_roster() {
        let mut store = SessionStore::new();
        store.set_users(vec![user("a", "A"), user("b", "B")]);
        store.update_score("b", 7);
        store.update_score("b", 3);
        store.update_score("ghost", 1);

        assert_eq!(store.score_of("b"), 3);
        assert_eq!(store.score_of("ghost"), 1);
        assert_eq!(store.score_of("a"), 0);
        assert_eq!(store.state().users[1].score, 3);
    }

    #[test]
    fn test_leaderboard_sorts_by_score() {
        let mut store = SessionStore::new();
        store.set_users(vec![user("a", "A"), user("b", "B"), user("c", "C")]);
        store.update_score("c", 5);
        store.update_score("a", 2);

        let order: Vec<_> = store.leaderboard().iter().map(|(u, _)| u.id.clone()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_is_drawer_follows_roster() {
        let mut store = SessionStore::new();
        assert!(!store.is_drawer());

        let me = user("me", "Me");
        store.set_user(me.clone());
        assert!(!store.is_drawer());

        let mut drawing = me.clone();
        drawing.is_drawing = Some(true);
        store.set_users(vec![drawing, user("b", "B")]);
        assert!(store.is_drawer());

        store.set_users(vec![me, user("b", "B")]);
        assert!(!store.is_drawer());
    }

    #[test]
    fn test_state_is_drawer_seen_by_subscribers() {
        let mut store = SessionStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_in = seen.clone();
        store.subscribe(Slice::Roster, move |state| seen_in.borrow_mut().push(state.is_drawer()));

        let mut me = user("me", "Me");
        me.is_drawing = Some(true);
        store.set_user(me.clone());
        assert!(store.state().is_drawer());

        // The roster entry overrides the identity's own flag.
        store.set_users(vec![user("me", "Me")]);
        store.set_users(vec![me]);
        assert_eq!(*seen.borrow(), vec![false, true]);
    }

    #[test]
    fn test_subscribers_see_only_their_slice() {
        let mut store = SessionStore::new();
        let chat_hits = Rc::new(RefCell::new(Vec::new()));
        let timer_hits = Rc::new(RefCell::new(0));

        let hits = chat_hits.clone();
        store.subscribe(Slice::Chat, move |state| {
            hits.borrow_mut().push(state.messages.len());
        });
        let hits = timer_hits.clone();
        let timer_sub = store.subscribe(Slice::Timer, move |_| {
            *hits.borrow_mut() += 1;
        });

        store.add_message(message("1", "a"));
        store.add_message(message("2", "b"));
        store.set_time_left(30);
        assert!(store.unsubscribe(timer_sub));
        store.set_time_left(29);
        store.set_room(Some(RoomRef {
            id: "public".into(),
            mode: GameMode::Mcq,
            is_private: false,
        }));

        assert_eq!(*chat_hits.borrow(), vec![1, 2]);
        assert_eq!(*timer_hits.borrow(), 1);
        assert!(!store.unsubscribe(timer_sub));
    }
}
