use std::{collections::VecDeque, fmt, str::FromStr};

use derive_more::Display;
use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::{PIECE_TEMPLATES, Piece, StoneColor};

/// Placements that must elapse before the first eye-frame is forced in.
pub const MIN_PIECES_BEFORE_EYE_FRAME: u32 = 14;
/// Per-placement chance of scheduling a frame once the first one is out.
pub const EYE_FRAME_DROP_CHANCE: f64 = 0.12;
/// Placements to wait after any scheduling before considering another.
pub const EYE_FRAME_COOLDOWN_PIECES: u32 = 6;

/// Seed for deterministic piece generation.
///
/// A 128-bit seed initializing the spawner RNG. Equal seeds produce equal
/// spawn sequences, including eye-frame scheduling decisions, which enables
/// replays and deterministic tests. Serializes as a 32-character hex string.
#[derive(Debug, Clone, Copy)]
pub struct SpawnSeed([u8; 16]);

impl SpawnSeed {
    /// The raw seed bytes, big-endian.
    #[must_use]
    pub fn bytes(self) -> [u8; 16] {
        self.0
    }
}

impl fmt::Display for SpawnSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

/// Error returned when a seed string is not 32 hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("invalid seed: expected a 32-character hex string")]
pub struct ParseSeedError;

impl std::error::Error for ParseSeedError {}

impl FromStr for SpawnSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParseSeedError);
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| ParseSeedError)?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for SpawnSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SpawnSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Distribution<SpawnSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> SpawnSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        SpawnSeed(seed)
    }
}

/// Produces the stream of falling pieces.
///
/// Random catalog templates by default, with a special-piece FIFO that
/// outranks random generation, plus the eye-frame scheduling state machine
/// (forced first drop, cooldown, then a per-placement chance).
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
    next: Option<Piece>,
    special_queue: VecDeque<Piece>,
    cooldown: u32,
    first_frame_pending: bool,
}

impl Default for Spawner {
    fn default() -> Self {
        Self::new()
    }
}

impl Spawner {
    /// Creates a spawner with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for deterministic spawns.
    #[must_use]
    pub fn with_seed(seed: SpawnSeed) -> Self {
        let mut this = Self {
            rng: Pcg32::from_seed(seed.0),
            next: None,
            special_queue: VecDeque::new(),
            cooldown: 0,
            first_frame_pending: true,
        };
        this.next = Some(this.pull_prototype());
        this
    }

    /// Clears queues and scheduling state for a fresh session. The RNG
    /// stream continues where it left off.
    pub fn reset(&mut self) {
        self.special_queue.clear();
        self.cooldown = 0;
        self.first_frame_pending = true;
        self.next = None;
        self.next = Some(self.pull_prototype());
    }

    fn pull_prototype(&mut self) -> Piece {
        if let Some(piece) = self.special_queue.pop_front() {
            return piece;
        }
        let index = self.rng.random_range(0..PIECE_TEMPLATES.len());
        Piece::from_template(&PIECE_TEMPLATES[index])
    }

    /// The piece that will spawn next, for previews.
    #[must_use]
    pub fn next_piece(&self) -> Option<&Piece> {
        self.next.as_ref()
    }

    /// Hands out the next piece at the spawn position and refills the
    /// preview slot.
    pub fn produce(&mut self) -> Piece {
        let piece = match self.next.take() {
            Some(piece) => piece,
            None => self.pull_prototype(),
        };
        self.next = Some(self.pull_prototype());
        piece.at_spawn()
    }

    /// Whether an eye-frame is already waiting in the preview slot or the
    /// special queue.
    #[must_use]
    pub fn has_pending_eye_frame(&self) -> bool {
        self.next.as_ref().is_some_and(Piece::is_eye_frame)
            || self.special_queue.iter().any(Piece::is_eye_frame)
    }

    /// Queues an eye-frame of the given color.
    ///
    /// Placement policy, checked in order: with no piece in flight and no
    /// priority the frame goes to the queue front (it becomes the piece
    /// after next); a prioritized frame, or an empty preview slot, swaps
    /// into the preview slot and pushes the displaced piece to the queue
    /// front; otherwise the frame goes ahead of pending specials unless the
    /// preview already holds a frame, in which case it waits at the back.
    pub fn enqueue_eye_frame(
        &mut self,
        color: StoneColor,
        prioritize_next: bool,
        has_current_piece: bool,
    ) {
        let prototype = Piece::eye_frame(color);
        if !has_current_piece && !prioritize_next {
            self.special_queue.push_front(prototype);
            return;
        }
        if prioritize_next || self.next.is_none() {
            if let Some(displaced) = self.next.take() {
                self.special_queue.push_front(displaced);
            }
            self.next = Some(prototype);
        } else if !self.next.as_ref().is_some_and(Piece::is_eye_frame) {
            self.special_queue.push_front(prototype);
        } else {
            self.special_queue.push_back(prototype);
        }
    }

    /// Runs the per-placement scheduling step. Returns true when a frame
    /// was queued this step.
    ///
    /// The first frame is forced as soon as enough pieces are placed and is
    /// prioritized into the preview slot; afterwards each qualifying
    /// placement rolls [`EYE_FRAME_DROP_CHANCE`]. Any scheduling arms the
    /// cooldown, which counts down one per qualifying placement.
    pub fn maybe_schedule_eye_frame(&mut self, pieces_placed: u32, has_current_piece: bool) -> bool {
        if pieces_placed < MIN_PIECES_BEFORE_EYE_FRAME {
            return false;
        }
        if self.has_pending_eye_frame() {
            return false;
        }
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return false;
        }
        if self.first_frame_pending {
            self.first_frame_pending = false;
            let color: StoneColor = self.rng.random();
            self.enqueue_eye_frame(color, true, has_current_piece);
            self.cooldown = EYE_FRAME_COOLDOWN_PIECES;
            return true;
        }
        if !self.rng.random_bool(EYE_FRAME_DROP_CHANCE) {
            return false;
        }
        let color: StoneColor = self.rng.random();
        self.enqueue_eye_frame(color, false, has_current_piece);
        self.cooldown = EYE_FRAME_COOLDOWN_PIECES;
        true
    }
}
