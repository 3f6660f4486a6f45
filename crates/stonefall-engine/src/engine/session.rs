use std::time::Duration;

use chrono::{DateTime, Utc};
use derive_more::{Display, IsVariant};
use rand::Rng as _;
use serde::Serialize;

use crate::{
    core::{
        Board, CaptureOutcome, CaptureTally, Piece, RotationDirection, run_capture_cascade,
    },
    engine::{
        eye_frame::{EyeFrameTracker, clear_frame_cells},
        spawner::{SpawnSeed, Spawner},
    },
};

const BASE_DROP_INTERVAL_MS: u64 = 900;
const MIN_DROP_INTERVAL_MS: u64 = 220;
/// Interval reduction per level.
const DROP_INTERVAL_STEP_MS: u64 = 80;
/// Drop interval at level 1.
pub const BASE_DROP_INTERVAL: Duration = Duration::from_millis(BASE_DROP_INTERVAL_MS);
/// Drop interval floor.
pub const MIN_DROP_INTERVAL: Duration = Duration::from_millis(MIN_DROP_INTERVAL_MS);
/// Placements per level-up.
pub const PIECES_PER_LEVEL: u32 = 5;
/// Base points per captured stone.
const POINTS_PER_STONE: u64 = 60;

/// Wall-kick column offsets tried in order after a rotation collides.
const ROTATION_KICKS: [isize; 5] = [0, -1, 1, -2, 2];

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IsVariant)]
pub enum SessionPhase {
    #[default]
    Idle,
    Playing,
    Paused,
    GameOver,
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum GameOverReason {
    /// A piece locked with cells still above the board.
    #[display("board overflow")]
    BoardOverflow,
    /// The next piece had no room to spawn.
    #[display("spawn blocked")]
    SpawnBlocked,
}

/// Final summary produced when a session ends.
#[derive(Debug, Clone, Serialize)]
pub struct GameOverReport {
    pub reason: GameOverReason,
    pub final_score: u64,
    pub chain: u32,
    pub captures: CaptureTally,
    pub timestamp: DateTime<Utc>,
}

/// Point-in-time view of the session counters.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub active: bool,
    pub paused: bool,
    pub score: u64,
    pub level: u32,
    pub chain: u32,
    pub captures: CaptureTally,
    pub pieces_placed: u32,
    pub danger: bool,
    pub last_result: Option<GameOverReport>,
}

/// Notable session happenings, buffered until drained with
/// [`GameSession::take_events`].
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SessionEvent {
    #[display("new game started")]
    Started,
    #[display("paused")]
    Paused,
    #[display("resumed")]
    Resumed,
    #[display("{removed} stones captured, chain x{chain}")]
    Captured { removed: u32, chain: u32 },
    #[display("level {level}, drop interval {interval_ms} ms")]
    LevelUp { level: u32, interval_ms: u64 },
    #[display("eye frame placed")]
    EyeFramePlaced,
    #[display("eye frame collapsed")]
    EyeFrameCollapsed,
    #[display("game over: {_0}")]
    GameOver(GameOverReason),
}

/// One full game: board, in-flight piece, spawner, eye-frame tracker, and
/// the score/level/chain state machine.
///
/// All mutation goes through the session's methods. Input commands are
/// no-ops unless the session is playing; time only advances through
/// [`Self::advance`].
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    current: Option<Piece>,
    spawner: Spawner,
    frames: EyeFrameTracker,
    phase: SessionPhase,
    score: u64,
    level: u32,
    chain: u32,
    pieces_placed: u32,
    captures: CaptureTally,
    drop_interval: Duration,
    drop_accumulator: Duration,
    danger: bool,
    last_result: Option<GameOverReport>,
    events: Vec<SessionEvent>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Creates an idle session with a random spawn seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a fixed seed for deterministic spawns.
    #[must_use]
    pub fn with_seed(seed: SpawnSeed) -> Self {
        Self {
            board: Board::new(),
            current: None,
            spawner: Spawner::with_seed(seed),
            frames: EyeFrameTracker::new(),
            phase: SessionPhase::Idle,
            score: 0,
            level: 1,
            chain: 0,
            pieces_placed: 0,
            captures: CaptureTally::default(),
            drop_interval: BASE_DROP_INTERVAL,
            drop_accumulator: Duration::ZERO,
            danger: false,
            last_result: None,
            events: Vec::new(),
        }
    }

    /// Starts a new game, resetting board, counters, and queues. Also
    /// restarts a game already in progress.
    pub fn start(&mut self) {
        self.board = Board::new();
        self.frames.clear();
        self.spawner.reset();
        self.phase = SessionPhase::Playing;
        self.score = 0;
        self.level = 1;
        self.chain = 0;
        self.pieces_placed = 0;
        self.captures = CaptureTally::default();
        self.drop_interval = BASE_DROP_INTERVAL;
        self.drop_accumulator = Duration::ZERO;
        self.danger = false;
        self.last_result = None;
        self.current = None;
        self.events.push(SessionEvent::Started);
        self.spawn_piece();
        self.update_danger();
    }

    pub fn pause(&mut self) {
        if !self.phase.is_playing() {
            return;
        }
        self.phase = SessionPhase::Paused;
        self.events.push(SessionEvent::Paused);
    }

    /// Resumes play. The drop accumulator restarts from zero so paused time
    /// never counts toward the next step.
    pub fn resume(&mut self) {
        if !self.phase.is_paused() {
            return;
        }
        self.phase = SessionPhase::Playing;
        self.drop_accumulator = Duration::ZERO;
        self.events.push(SessionEvent::Resumed);
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            SessionPhase::Playing => self.pause(),
            SessionPhase::Paused => self.resume(),
            SessionPhase::Idle | SessionPhase::GameOver => self.start(),
        }
    }

    pub fn move_left(&mut self) {
        self.shift(-1);
    }

    pub fn move_right(&mut self) {
        self.shift(1);
    }

    fn shift(&mut self, d_col: isize) {
        if !self.phase.is_playing() {
            return;
        }
        let Some(current) = &self.current else {
            return;
        };
        if self.board.is_valid_position(current, 0, d_col) {
            self.current = Some(current.translated(0, d_col));
            self.update_danger();
        }
    }

    /// Rotates the in-flight piece, trying each wall-kick offset in order.
    /// When no kicked position fits, the piece is left unchanged.
    pub fn rotate(&mut self, direction: RotationDirection) {
        if !self.phase.is_playing() {
            return;
        }
        let Some(current) = &self.current else {
            return;
        };
        let rotated = current.rotated(direction);
        for kick in ROTATION_KICKS {
            let candidate =
                rotated.with_position(current.position().row, current.position().col + kick);
            if self.board.is_valid_position(&candidate, 0, 0) {
                self.current = Some(candidate);
                self.update_danger();
                return;
            }
        }
    }

    /// Moves the piece down one row, locking it if it cannot move.
    pub fn soft_drop(&mut self) {
        if !self.phase.is_playing() {
            return;
        }
        self.step_down();
    }

    /// Drops the piece straight to its resting row and locks it.
    pub fn hard_drop(&mut self) {
        if !self.phase.is_playing() {
            return;
        }
        let Some(mut current) = self.current.take() else {
            return;
        };
        while self.board.is_valid_position(&current, 1, 0) {
            current = current.translated(1, 0);
        }
        self.current = Some(current);
        self.lock_piece();
    }

    /// Advances the session clock, soft-dropping once per elapsed drop
    /// interval. Paused and idle sessions ignore elapsed time.
    pub fn advance(&mut self, delta: Duration) {
        if !self.phase.is_playing() || self.current.is_none() {
            return;
        }
        self.drop_accumulator += delta;
        while self.drop_accumulator >= self.drop_interval {
            self.drop_accumulator -= self.drop_interval;
            self.step_down();
            if !self.phase.is_playing() || self.current.is_none() {
                break;
            }
        }
    }

    fn step_down(&mut self) {
        let Some(current) = &self.current else {
            return;
        };
        if self.board.is_valid_position(current, 1, 0) {
            self.current = Some(current.translated(1, 0));
            self.update_danger();
        } else {
            self.lock_piece();
        }
    }

    /// Writes the piece into the board and runs the full lock pipeline:
    /// gravity, capture cascade, eye-frame bookkeeping, scoring, level
    /// progression, scheduling, and the next spawn.
    #[expect(clippy::cast_sign_loss)]
    fn lock_piece(&mut self) {
        let Some(piece) = self.current.take() else {
            return;
        };

        let mut overflow = false;
        let mut frame_center = None;
        for (row, col, cell) in piece.cell_positions() {
            if row < 0 {
                overflow = true;
                continue;
            }
            let (row, col) = (row as usize, col as usize);
            self.board.set_cell(row, col, cell.lock_value());
            self.board.set_locked(row, col, cell.lock_on_place);
            if cell.is_eye_center {
                frame_center = Some((row, col));
            }
        }
        if overflow {
            self.end_game(GameOverReason::BoardOverflow);
            return;
        }

        let placed_eye_frame = piece.is_eye_frame();
        if let Some((row, col)) = frame_center {
            self.frames.place(row, col, self.score);
            self.events.push(SessionEvent::EyeFramePlaced);
        }

        self.board.apply_gravity();

        // Cascade, decrement frames by the cascade total, clear collapsed
        // frames, and cascade again over the vacated cells until a round
        // collapses nothing.
        let mut aggregate = CaptureOutcome::default();
        loop {
            let cascade = run_capture_cascade(&mut self.board);
            let removed = cascade.total_removed;
            aggregate.absorb(cascade);

            let collapsed = self.frames.absorb_captures(removed);
            if collapsed.is_empty() {
                break;
            }
            for frame in &collapsed {
                clear_frame_cells(&mut self.board, frame.center_row, frame.center_col);
            }
            self.board.apply_gravity();
            self.events.push(SessionEvent::EyeFrameCollapsed);
        }

        if aggregate.total_removed > 0 {
            self.chain += 1;
            let removed = u64::from(aggregate.total_removed);
            // floor(removed * 60 * (1 + (chain - 1) * 0.5)), kept integral.
            let points = removed * POINTS_PER_STONE
                + removed * (POINTS_PER_STONE / 2) * u64::from(self.chain - 1);
            self.score += points;
            self.captures.black += aggregate.capture_totals.black;
            self.captures.white += aggregate.capture_totals.white;
            self.events.push(SessionEvent::Captured {
                removed: aggregate.total_removed,
                chain: self.chain,
            });
        } else {
            self.chain = 0;
        }

        self.pieces_placed += 1;
        if self.pieces_placed % PIECES_PER_LEVEL == 0 {
            self.level += 1;
            let interval_ms = drop_interval_ms_for(self.level);
            self.drop_interval = Duration::from_millis(interval_ms);
            self.events.push(SessionEvent::LevelUp {
                level: self.level,
                interval_ms,
            });
        }

        self.spawner
            .maybe_schedule_eye_frame(self.pieces_placed, self.current.is_some());

        // An eye-frame lock breaks the chain even if it triggered captures.
        if placed_eye_frame {
            self.chain = 0;
        }

        self.spawn_piece();
        self.update_danger();
    }

    fn spawn_piece(&mut self) -> bool {
        if !self.phase.is_playing() {
            return false;
        }
        let piece = self.spawner.produce();
        self.drop_accumulator = Duration::ZERO;
        if !self.board.is_valid_position(&piece, 0, 0) {
            self.end_game(GameOverReason::SpawnBlocked);
            return false;
        }
        self.current = Some(piece);
        true
    }

    fn end_game(&mut self, reason: GameOverReason) {
        self.phase = SessionPhase::GameOver;
        self.current = None;
        self.danger = false;
        let report = GameOverReport {
            reason,
            final_score: self.score,
            chain: self.chain,
            captures: self.captures,
            timestamp: Utc::now(),
        };
        self.last_result = Some(report);
        self.events.push(SessionEvent::GameOver(reason));
    }

    fn update_danger(&mut self) {
        self.danger = self.board.is_danger_zone(self.current.as_ref());
    }

    /// Drains the buffered events in emission order.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            active: self.phase.is_playing() || self.phase.is_paused(),
            paused: self.phase.is_paused(),
            score: self.score,
            level: self.level,
            chain: self.chain,
            captures: self.captures,
            pieces_placed: self.pieces_placed,
            danger: self.danger,
            last_result: self.last_result.clone(),
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn current_piece(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn next_piece(&self) -> Option<&Piece> {
        self.spawner.next_piece()
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn chain(&self) -> u32 {
        self.chain
    }

    #[must_use]
    pub fn pieces_placed(&self) -> u32 {
        self.pieces_placed
    }

    #[must_use]
    pub fn captures(&self) -> CaptureTally {
        self.captures
    }

    #[must_use]
    pub fn drop_interval(&self) -> Duration {
        self.drop_interval
    }

    #[must_use]
    pub fn is_danger(&self) -> bool {
        self.danger
    }

    #[must_use]
    pub fn last_result(&self) -> Option<&GameOverReport> {
        self.last_result.as_ref()
    }
}

fn drop_interval_ms_for(level: u32) -> u64 {
    BASE_DROP_INTERVAL_MS
        .saturating_sub(u64::from(level.saturating_sub(1)) * DROP_INTERVAL_STEP_MS)
        .max(MIN_DROP_INTERVAL_MS)
}

#[cfg(test)]
mod tests {
    use rand::Rng as _;

    use super::*;
    use crate::core::{COLS, Cell, PIECE_TEMPLATES, ROWS, StoneColor};

    fn seeded_session() -> GameSession {
        let seed: SpawnSeed = serde_json::from_str("\"0123456789abcdef0123456789abcdef\"").unwrap();
        GameSession::with_seed(seed)
    }

    /// Swaps the in-flight piece for a Seki (2×2, no self-capture when
    /// locked away from the walls) so lock outcomes do not depend on what
    /// the seeded spawner produced.
    fn force_seki(session: &mut GameSession) {
        session.current = Some(Piece::from_template(&PIECE_TEMPLATES[8]));
    }

    #[test]
    fn start_spawns_a_piece_and_emits_started() {
        let mut session = seeded_session();
        session.start();

        assert!(session.phase().is_playing());
        assert!(session.current_piece().is_some());
        assert!(session.next_piece().is_some());
        let events = session.take_events();
        assert_eq!(events[0], SessionEvent::Started);
    }

    #[test]
    fn inputs_are_ignored_while_idle_or_paused() {
        let mut session = seeded_session();
        session.move_left();
        session.hard_drop();
        assert_eq!(session.pieces_placed(), 0);

        session.start();
        session.pause();
        let before = session.current_piece().unwrap().position();
        session.move_left();
        session.soft_drop();
        assert_eq!(session.current_piece().unwrap().position(), before);
    }

    #[test]
    fn shift_respects_the_walls() {
        let mut session = seeded_session();
        session.start();
        for _ in 0..COLS {
            session.move_left();
        }
        assert_eq!(session.current_piece().unwrap().position().col, 0);
        for _ in 0..COLS {
            session.move_right();
        }
        let piece = session.current_piece().unwrap();
        let rightmost = piece
            .cell_positions()
            .map(|(_, col, _)| col)
            .max()
            .unwrap();
        assert_eq!(rightmost, COLS as isize - 1);
    }

    #[test]
    fn rotation_kicks_off_the_right_wall() {
        let mut session = seeded_session();
        session.start();
        // Vertical four-stone column near the right wall; rotating to a
        // 4-wide row only fits after the -2 kick.
        let bamboo = Piece::from_template(&PIECE_TEMPLATES[2]).with_position(5, 8);
        session.current = Some(bamboo);

        session.rotate(RotationDirection::Clockwise);

        let piece = session.current_piece().unwrap();
        assert_eq!(piece.rotation(), 1);
        assert_eq!(piece.position().col, 6);
    }

    #[test]
    fn rotation_is_a_no_op_when_no_kick_fits() {
        let mut session = seeded_session();
        session.start();
        // Flush against the wall even the widest kick cannot reach a
        // column where the 4-wide row fits.
        let bamboo = Piece::from_template(&PIECE_TEMPLATES[2]).with_position(5, 9);
        session.current = Some(bamboo.clone());

        session.rotate(RotationDirection::Clockwise);

        assert_eq!(session.current_piece().unwrap(), &bamboo);
    }

    #[test]
    fn hard_drop_locks_and_counts_the_placement() {
        let mut session = seeded_session();
        session.start();
        force_seki(&mut session);
        session.hard_drop();

        assert_eq!(session.pieces_placed(), 1);
        assert_eq!(session.score(), 0);
        assert!(session.current_piece().is_some());
        let stones = session
            .board()
            .rows()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .count();
        assert_eq!(stones, 4);
    }

    #[test]
    fn advance_steps_the_piece_once_per_interval() {
        let mut session = seeded_session();
        session.start();
        let start_row = session.current_piece().unwrap().position().row;

        session.advance(BASE_DROP_INTERVAL);
        assert_eq!(
            session.current_piece().unwrap().position().row,
            start_row + 1
        );

        // A partial interval does nothing.
        session.advance(BASE_DROP_INTERVAL / 2);
        assert_eq!(
            session.current_piece().unwrap().position().row,
            start_row + 1
        );
    }

    #[test]
    fn pause_freezes_the_clock_and_resume_restarts_it() {
        let mut session = seeded_session();
        session.start();
        let start_row = session.current_piece().unwrap().position().row;

        session.pause();
        session.advance(BASE_DROP_INTERVAL * 10);
        assert_eq!(session.current_piece().unwrap().position().row, start_row);
        assert_eq!(session.pieces_placed(), 0);

        session.resume();
        // Time accumulated before the pause was discarded.
        session.advance(BASE_DROP_INTERVAL / 2);
        assert_eq!(session.current_piece().unwrap().position().row, start_row);
    }

    #[test]
    fn capture_on_lock_scores_and_builds_the_chain() {
        let mut session = seeded_session();
        session.start();
        // Corner trap: a black stone with both neighbors white loses its
        // last liberty the moment any lock triggers the cascade.
        session.board.set_cell(ROWS - 1, 0, Cell::Black);
        session.board.set_cell(ROWS - 2, 0, Cell::White);
        session.board.set_cell(ROWS - 1, 1, Cell::White);

        force_seki(&mut session);
        session.hard_drop();

        assert_eq!(session.score(), 60);
        assert_eq!(session.chain(), 1);
        assert_eq!(session.captures().white, 1);
        assert_eq!(session.captures().black, 0);
        assert!(session
            .take_events()
            .contains(&SessionEvent::Captured { removed: 1, chain: 1 }));
        // The freed corner was backfilled by the settling white stone.
        assert_eq!(session.board().cell(ROWS - 1, 0), Cell::White);
    }

    #[test]
    fn captureless_lock_resets_the_chain() {
        let mut session = seeded_session();
        session.start();
        session.board.set_cell(ROWS - 1, 0, Cell::Black);
        session.board.set_cell(ROWS - 2, 0, Cell::White);
        session.board.set_cell(ROWS - 1, 1, Cell::White);
        force_seki(&mut session);
        session.hard_drop();
        assert_eq!(session.chain(), 1);

        force_seki(&mut session);
        session.hard_drop();
        assert_eq!(session.chain(), 0);
        // Score keeps what the chain earned.
        assert_eq!(session.score(), 60);
    }

    #[test]
    fn chain_multiplier_grows_per_consecutive_capture() {
        let removed = 2u64;
        // chain 1: x1.0, chain 2: x1.5, chain 3: x2.0
        let chain1 = removed * 60;
        let chain2 = removed * 60 + removed * 30;
        let chain3 = removed * 60 + removed * 30 * 2;
        assert_eq!(chain1, 120);
        assert_eq!(chain2, 180);
        assert_eq!(chain3, 240);
    }

    #[test]
    fn every_fifth_placement_levels_up_and_speeds_the_drop() {
        let mut session = seeded_session();
        session.start();
        for _ in 0..PIECES_PER_LEVEL {
            force_seki(&mut session);
            session.hard_drop();
        }

        assert_eq!(session.pieces_placed(), PIECES_PER_LEVEL);
        assert_eq!(session.level(), 2);
        assert_eq!(session.drop_interval(), Duration::from_millis(820));
        assert!(session
            .take_events()
            .iter()
            .any(|event| matches!(event, SessionEvent::LevelUp { level: 2, .. })));
    }

    #[test]
    fn drop_interval_bottoms_out_at_the_floor() {
        assert_eq!(drop_interval_ms_for(1), 900);
        assert_eq!(drop_interval_ms_for(2), 820);
        assert_eq!(drop_interval_ms_for(9), 260);
        assert_eq!(drop_interval_ms_for(10), MIN_DROP_INTERVAL_MS);
        assert_eq!(drop_interval_ms_for(50), MIN_DROP_INTERVAL_MS);
    }

    #[test]
    fn locking_above_the_board_ends_the_game() {
        let mut session = seeded_session();
        session.start();
        for row in 0..ROWS {
            for col in 0..COLS {
                session.board.set_cell(row, col, Cell::Black);
            }
        }

        session.hard_drop();

        assert!(session.phase().is_game_over());
        let report = session.last_result().unwrap();
        assert_eq!(report.reason, GameOverReason::BoardOverflow);
        assert_eq!(report.final_score, 0);
        let snapshot = session.snapshot();
        assert!(!snapshot.active);
        assert!(session
            .take_events()
            .contains(&SessionEvent::GameOver(GameOverReason::BoardOverflow)));
    }

    #[test]
    fn restart_after_game_over_resets_everything() {
        let mut session = seeded_session();
        session.start();
        for row in 0..ROWS {
            for col in 0..COLS {
                session.board.set_cell(row, col, Cell::Black);
            }
        }
        session.hard_drop();
        assert!(session.phase().is_game_over());

        session.toggle_pause();

        assert!(session.phase().is_playing());
        assert_eq!(session.score(), 0);
        assert_eq!(session.pieces_placed(), 0);
        assert!(session.current_piece().is_some());
        assert!(session
            .board()
            .rows()
            .flatten()
            .all(|cell| cell.is_empty()));
    }

    #[test]
    fn eye_frame_lock_places_a_frame_and_breaks_the_chain() {
        let mut session = seeded_session();
        session.start();
        // Corner trap: the frame lock itself triggers a one-stone capture,
        // which would normally start a chain.
        session.board.set_cell(ROWS - 1, 0, Cell::Black);
        session.board.set_cell(ROWS - 2, 0, Cell::White);
        session.board.set_cell(ROWS - 1, 1, Cell::White);

        session.current = Some(Piece::eye_frame(StoneColor::Black));
        session.hard_drop();

        // Capture points are kept, but an eye-frame lock breaks the chain.
        assert_eq!(session.score(), 60);
        assert_eq!(session.chain(), 0);
        assert_eq!(session.frames.frames().len(), 1);
        // The freshly placed frame absorbs its own lock's capture.
        assert_eq!(session.frames.frames()[0].captures_left, 19);
        assert!(session
            .take_events()
            .contains(&SessionEvent::EyeFramePlaced));
    }

    #[test]
    fn frame_collapse_clears_its_cells_and_recascades() {
        let mut session = seeded_session();
        session.start();

        // Drop the frame dead center on the empty board.
        session.current = Some(Piece::eye_frame(StoneColor::Black));
        session.hard_drop();
        assert_eq!(session.frames.frames().len(), 1);
        assert_eq!(session.frames.frames()[0].captures_left, 20);
        let center = (
            session.frames.frames()[0].center_row,
            session.frames.frames()[0].center_col,
        );

        // Twenty doomed black stones along the left wall, sealed by white.
        for row in ROWS - 10..ROWS {
            session.board.set_cell(row, 0, Cell::Black);
            session.board.set_cell(row, 1, Cell::Black);
            session.board.set_cell(row, 2, Cell::White);
        }
        session.board.set_cell(ROWS - 11, 0, Cell::White);
        session.board.set_cell(ROWS - 11, 1, Cell::White);

        // Trigger the cascade with a lock away from the trap and the frame.
        force_seki(&mut session);
        for _ in 0..3 {
            session.move_right();
        }
        session.hard_drop();

        assert!(session.frames.frames().is_empty());
        for (d_row, d_col) in crate::core::EYE_FRAME_RING_OFFSETS {
            let row = center.0.wrapping_add_signed(d_row);
            let col = center.1.wrapping_add_signed(d_col);
            assert!(!session.board().is_locked(row, col));
        }
        assert!(session
            .take_events()
            .contains(&SessionEvent::EyeFrameCollapsed));
        // 20 stones at chain 1.
        assert_eq!(session.score(), 1200);
        assert_eq!(session.captures().white, 20);
    }

    #[test]
    fn game_over_report_serializes_with_all_fields() {
        let report = GameOverReport {
            reason: GameOverReason::SpawnBlocked,
            final_score: 4200,
            chain: 3,
            captures: CaptureTally {
                black: 12,
                white: 7,
            },
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["reason"], "SpawnBlocked");
        assert_eq!(json["final_score"], 4200);
        assert_eq!(json["chain"], 3);
        assert_eq!(json["captures"]["black"], 12);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn session_events_render_human_readable() {
        assert_eq!(
            SessionEvent::Captured {
                removed: 3,
                chain: 2
            }
            .to_string(),
            "3 stones captured, chain x2"
        );
        assert_eq!(
            SessionEvent::GameOver(GameOverReason::BoardOverflow).to_string(),
            "game over: board overflow"
        );
    }

    #[test]
    fn equal_seeds_play_identical_sessions() {
        let mut rng = rand::rng();
        let seed: SpawnSeed = rng.random();
        let mut session1 = GameSession::with_seed(seed);
        let mut session2 = GameSession::with_seed(seed);
        session1.start();
        session2.start();

        for _ in 0..30 {
            session1.hard_drop();
            session2.hard_drop();
        }

        assert_eq!(session1.score(), session2.score());
        assert_eq!(session1.pieces_placed(), session2.pieces_placed());
        assert_eq!(session1.board(), session2.board());
    }
}
