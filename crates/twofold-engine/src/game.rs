//! The twofold coordinator: two coupled boards, one turn/phase machine.
//!
//! All game mutation funnels through [`Game::submit`]. The variant rules
//! live here: the Main→Secondary capture mirror (en passant mirrors both
//! ways), check-response gating, per-board outcomes, and the
//! castle-once-per-game rule.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::board::{Board, BoardOutcome, Square};
use crate::error::MoveError;
use crate::piece::Color;
use crate::rules::{self, BoardStatus, CastleSide, Move};

/// Which of the two boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoardName {
    Main,
    Secondary,
}

impl BoardName {
    pub fn other(self) -> Self {
        match self {
            Self::Main => Self::Secondary,
            Self::Secondary => Self::Main,
        }
    }
}

impl fmt::Display for BoardName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "main"),
            Self::Secondary => write!(f, "secondary"),
        }
    }
}

/// The overall result once `game_over` is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    White,
    Black,
    Draw,
}

impl From<Color> for Winner {
    fn from(color: Color) -> Self {
        match color {
            Color::White => Self::White,
            Color::Black => Self::Black,
        }
    }
}

/// Reset votes by color. Both must be set before a multiplayer game
/// restarts in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetVotes {
    #[serde(rename = "White")]
    pub white: bool,
    #[serde(rename = "Black")]
    pub black: bool,
}

/// What an accepted move did, for the caller's logging and broadcasts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Human-readable record appended to the move list.
    pub notation: String,
    /// The board the opponent is now pinned to, if the move gave check.
    pub delivered_check: Option<BoardName>,
    /// `true` when this move ended the game.
    pub finished: bool,
}

/// One twofold chess game: two boards plus the coupling state.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    main: Board,
    secondary: Board,
    pub turn: Color,
    pub active_phase: BoardName,
    /// When set, the side to move must play on this board.
    pub responding_to_check_on: Option<BoardName>,
    pub moves: Vec<String>,
    pub winner: Option<Winner>,
    pub game_over: bool,
    pub reset_votes: ResetVotes,
}

impl Game {
    /// A fresh game: the standard start position duplicated on both
    /// boards, White to move on Main.
    pub fn new() -> Self {
        Self {
            main: Board::initial(),
            secondary: Board::initial(),
            turn: Color::White,
            active_phase: BoardName::Main,
            responding_to_check_on: None,
            moves: Vec::new(),
            winner: None,
            game_over: false,
            reset_votes: ResetVotes::default(),
        }
    }

    /// Builds a game from explicit boards (scenario presets, snapshot
    /// reload). Callers are expected to run [`Game::normalize_phase`]
    /// afterwards unless the state is already consistent.
    pub fn from_boards(main: Board, secondary: Board, turn: Color, phase: BoardName) -> Self {
        Self {
            main,
            secondary,
            turn,
            active_phase: phase,
            responding_to_check_on: None,
            moves: Vec::new(),
            winner: None,
            game_over: false,
            reset_votes: ResetVotes::default(),
        }
    }

    pub fn board(&self, name: BoardName) -> &Board {
        match name {
            BoardName::Main => &self.main,
            BoardName::Secondary => &self.secondary,
        }
    }

    pub fn board_mut(&mut self, name: BoardName) -> &mut Board {
        match name {
            BoardName::Main => &mut self.main,
            BoardName::Secondary => &mut self.secondary,
        }
    }

    /// Returns `true` when the piece at `from` on `board` carries the
    /// given wire label. Used to reject moves referencing stale state.
    pub fn piece_label_matches(&self, board: BoardName, from: Square, label: &str) -> bool {
        self.board(board)
            .piece_at(from)
            .is_some_and(|p| p.label() == label)
    }

    /// Submits a move for `color` on `board`.
    ///
    /// On success the game has advanced (boards, outcomes, phase, turn,
    /// move list); on rejection nothing changed.
    pub fn submit(
        &mut self,
        color: Color,
        board: BoardName,
        mv: &Move,
    ) -> Result<MoveOutcome, MoveError> {
        if self.game_over {
            return Err(MoveError::GameOver);
        }
        if color != self.turn {
            return Err(MoveError::NotYourTurn);
        }
        // Check gating first: while in check, every wrong-board attempt
        // is answered with the board the defender must play on.
        if let Some(checked) = self.responding_to_check_on {
            if checked != board {
                return Err(MoveError::MustRespondToCheckOn(checked));
            }
        }
        // A frozen board is never playable; a board out of phase is
        // playable only when the phase board is itself frozen.
        if !self.board(board).outcome.is_active()
            || (board != self.active_phase
                && self.board(self.active_phase).outcome.is_active())
        {
            return Err(MoveError::WrongBoard {
                expected: self.active_phase,
                actual: board,
            });
        }

        let pre = *self.board(board);
        let moved_label = pre
            .piece_at(mv.from)
            .filter(|p| p.color == color)
            .ok_or(MoveError::NoSuchPiece)?
            .label();
        let (next, fx) = rules::apply_move(&pre, color, mv)?;
        *self.board_mut(board) = next;

        // Capture mirror: any Main capture removes the same id from
        // Secondary; Secondary captures mirror only when en passant.
        if let Some(captured) = fx.captured {
            if board == BoardName::Main || fx.en_passant {
                let mirror = board.other();
                if let Some(sq) = self
                    .board_mut(mirror)
                    .remove_by_id(captured.color, captured.id)
                {
                    tracing::debug!(
                        captured = %captured.label(),
                        board = %mirror,
                        square = %sq,
                        "capture mirrored"
                    );
                }
            }
        }

        // Castling once per game per side: a castle on either board
        // forfeits the remaining rights on both.
        if fx.castled.is_some() {
            self.board_mut(board.other()).castling.clear(color);
        }

        // Re-evaluate the opponent on both still-active boards, the
        // played board first so it wins ties for mate and check.
        let opponent = color.opponent();
        let mut mate_on = None;
        let mut delivered_check = None;
        for name in [board, board.other()] {
            if !self.board(name).outcome.is_active() {
                continue;
            }
            match rules::classify(self.board(name), opponent) {
                BoardStatus::Checkmate => {
                    self.board_mut(name).outcome = BoardOutcome::win_for(color);
                    mate_on = Some(name);
                    break;
                }
                BoardStatus::Stalemate => {
                    self.board_mut(name).outcome = BoardOutcome::DrawStalemate;
                }
                BoardStatus::Active => {
                    if delivered_check.is_none()
                        && rules::is_in_check(self.board(name), opponent)
                    {
                        delivered_check = Some(name);
                    }
                }
            }
        }

        let notation = notation(board, &moved_label, mv, &fx, mate_on.is_some(), delivered_check.is_some());
        self.moves.push(notation.clone());
        self.responding_to_check_on = None;

        if mate_on.is_some() {
            self.game_over = true;
            self.winner = Some(color.into());
            return Ok(MoveOutcome {
                notation,
                delivered_check: None,
                finished: true,
            });
        }

        self.turn = opponent;
        if let Some(checked) = delivered_check {
            // The mover's turn ends immediately; the defender is pinned
            // to the checked board.
            self.responding_to_check_on = Some(checked);
            self.active_phase = checked;
        } else {
            let main_active = self.main.outcome.is_active();
            let secondary_active = self.secondary.outcome.is_active();
            if !main_active && !secondary_active {
                // Both boards resolved without a mate: stalemates only.
                self.game_over = true;
                self.winner = Some(Winner::Draw);
            } else {
                let toggled = board.other();
                self.active_phase = if self.board(toggled).outcome.is_active() {
                    toggled
                } else {
                    board
                };
            }
        }

        Ok(MoveOutcome {
            notation,
            delivered_check,
            finished: self.game_over,
        })
    }

    /// Records a reset vote. Returns `true` when both colors have voted
    /// and the game was re-initialized.
    pub fn vote_reset(&mut self, color: Color) -> bool {
        match color {
            Color::White => self.reset_votes.white = true,
            Color::Black => self.reset_votes.black = true,
        }
        if self.reset_votes.white && self.reset_votes.black {
            self.reset();
            true
        } else {
            false
        }
    }

    /// Re-initializes to the start state: fresh boards, empty move list,
    /// votes cleared.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Verifies the kings invariant: exactly one king per color on each
    /// unresolved board. A violation means the game state is corrupt and
    /// the room must refuse further moves.
    pub fn integrity(&self) -> Result<(), String> {
        for name in [BoardName::Main, BoardName::Secondary] {
            let board = self.board(name);
            if !board.outcome.is_active() {
                continue;
            }
            for color in [Color::White, Color::Black] {
                let kings = board
                    .pieces(color)
                    .filter(|(_, p)| p.kind == crate::piece::PieceKind::King)
                    .count();
                if kings != 1 {
                    return Err(format!(
                        "board {name}: expected exactly one {color} king, found {kings}"
                    ));
                }
            }
        }
        Ok(())
    }

    /// Settles an externally installed position (scenario preset or
    /// snapshot) onto a playable phase: freezes boards that are already
    /// stalemate for the side to move, re-targets the phase at an active
    /// board, and declares the game over when nothing is left to play.
    pub fn normalize_phase(&mut self) {
        if self.game_over {
            return;
        }

        fn freeze_if_stalemate(game: &mut Game, name: BoardName, player: Color) -> bool {
            if game.board(name).outcome.is_active()
                && rules::classify(game.board(name), player) == BoardStatus::Stalemate
            {
                game.board_mut(name).outcome = BoardOutcome::DrawStalemate;
            }
            game.board(name).outcome.is_active()
        }

        let player = self.turn;
        let cur = self.active_phase;
        let alt = cur.other();

        if !freeze_if_stalemate(self, cur, player) && freeze_if_stalemate(self, alt, player) {
            self.active_phase = alt;
        }

        if !self.main.outcome.is_active() && !self.secondary.outcome.is_active() {
            self.game_over = true;
            self.winner = Some(match (self.main.outcome, self.secondary.outcome) {
                (BoardOutcome::WhiteWins, _) | (_, BoardOutcome::WhiteWins) => Winner::White,
                (BoardOutcome::BlackWins, _) | (_, BoardOutcome::BlackWins) => Winner::Black,
                _ => Winner::Draw,
            });
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the human-readable move record: `P5(e2-e4)`, capture suffix
/// `xp4`, promotion `=Q`, en passant ` e.p.`, castling `O-O`/`O-O-O`;
/// secondary-board moves carry an `s:` prefix; `+`/`#` close checks and
/// mates.
fn notation(
    board: BoardName,
    moved_label: &str,
    mv: &Move,
    fx: &rules::MoveEffects,
    mate: bool,
    check: bool,
) -> String {
    let mut s = String::new();
    if board == BoardName::Secondary {
        s.push_str("s:");
    }
    match fx.castled {
        Some(CastleSide::Kingside) => s.push_str("O-O"),
        Some(CastleSide::Queenside) => s.push_str("O-O-O"),
        None => {
            s.push_str(moved_label);
            s.push('(');
            s.push_str(&mv.from.to_string());
            s.push('-');
            s.push_str(&mv.to.to_string());
            s.push(')');
            if let Some(captured) = fx.captured {
                s.push('x');
                s.push_str(&captured.label());
            }
            if let Some(kind) = fx.promoted {
                s.push('=');
                s.push(kind.letter());
            }
            if fx.en_passant {
                s.push_str(" e.p.");
            }
        }
    }
    if mate {
        s.push('#');
    } else if check {
        s.push('+');
    }
    s
}
